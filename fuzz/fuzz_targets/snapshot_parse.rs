#![no_main]

use libfuzzer_sys::fuzz_target;
use riskboard_core::{parse_dashboard_snapshot, RiskLevel, SnapshotValidationError};

fuzz_target!(|data: &[u8]| {
    let raw = String::from_utf8_lossy(data);

    match parse_dashboard_snapshot(&raw) {
        Ok(snapshot) => {
            let safeguard = snapshot.control_safeguard();
            assert_eq!(safeguard.active() + safeguard.inactive(), safeguard.total());
            assert!(!safeguard.trend().is_empty());
            assert!(
                snapshot.site_assessment().distributed_count()
                    <= u64::from(snapshot.site_assessment().total())
            );
            assert!(snapshot
                .risk_samples()
                .windows(2)
                .all(|pair| pair[0].date() <= pair[1].date()));
            for record in snapshot.site_records() {
                let expected = riskboard_core::classify_risk_score(record.score())
                    .expect("validated scores classify");
                assert_eq!(record.risk_level(), expected.level);
                assert_eq!(record.color(), expected.color);
                assert!(RiskLevel::ALL.contains(&record.risk_level()));
            }
        }
        Err(error) => {
            if let Some(validation) = error
                .chain()
                .find_map(|cause| cause.downcast_ref::<SnapshotValidationError>())
            {
                assert!(!validation.issues.is_empty());
            }
        }
    }
});
