use printshop_db::DemoDataset;

use crate::commands::{with_pool, CommandResult};

pub fn run() -> CommandResult {
    let result = with_pool("seed", |pool| async move {
        let seeded = DemoDataset::load(&pool)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), 5u8))?;

        let verification = DemoDataset::verify(&pool)
            .await
            .map_err(|error| ("seed_verification", error.to_string(), 6u8))?;

        if !verification.all_present {
            let failed_checks = verification
                .checks
                .iter()
                .filter_map(|(check, passed)| (!passed).then_some(*check))
                .collect::<Vec<_>>();
            let message = if failed_checks.is_empty() {
                "some seed data failed to load".to_string()
            } else {
                format!("seed verification failed for checks: {}", failed_checks.join(", "))
            };
            return Err(("seed_verification", message, 6u8));
        }

        Ok(seeded)
    });

    match result {
        Ok(seeded) => CommandResult::success(
            "seed",
            format!(
                "demo dataset loaded: quote {} (version {}) with a planned job {}",
                seeded.quote_code, seeded.quote_version_id, seeded.job_id
            ),
        ),
        Err(failure) => failure,
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn verification_error_message_targets_failed_checks() {
        let checks = [("demo-quote", true), ("planned-job", false), ("pla-spool", false)];

        let failed_checks = checks
            .iter()
            .filter_map(|(check, passed)| (!passed).then_some(*check))
            .collect::<Vec<_>>();
        let message = if failed_checks.is_empty() {
            "some seed data failed to load".to_string()
        } else {
            format!("seed verification failed for checks: {}", failed_checks.join(", "))
        };

        assert_eq!(message, "seed verification failed for checks: planned-job, pla-spool");
    }
}
