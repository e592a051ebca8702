pub mod cache;
pub mod doctor;
pub mod export;
pub mod nutrition;
pub mod pantry;
pub mod plan;

use anyhow::Result;
use larder::config::LarderConfig;
use larder::kv::SqliteMedium;

/// Open the configured database as a key-value medium with the configured quota.
pub fn open_medium(config: &LarderConfig) -> Result<SqliteMedium> {
    let conn = larder::db::open_database(config.resolved_db_path())?;
    Ok(SqliteMedium::new(conn).with_quota(config.storage.max_value_bytes))
}

/// Reject NaN, infinite, and negative numbers from the command line.
pub fn ensure_amount(flag: &str, value: f64) -> Result<()> {
    anyhow::ensure!(
        value.is_finite() && value >= 0.0,
        "--{flag} must be a finite, non-negative number (got {value})"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_amount_rejects_non_finite_and_negative() {
        assert!(ensure_amount("calories", 0.0).is_ok());
        assert!(ensure_amount("calories", 512.5).is_ok());
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, -1.0] {
            assert!(ensure_amount("calories", bad).is_err());
        }
    }
}
