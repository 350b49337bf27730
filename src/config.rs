/// Policy for the secondary holding-balance write performed after a
/// transaction row is stored. `BestEffort` logs and swallows an adjustment
/// failure; `Atomic` runs both writes in one database transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteConsistency {
    BestEffort,
    Atomic,
}

impl WriteConsistency {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "best-effort" => Some(WriteConsistency::BestEffort),
            "atomic" => Some(WriteConsistency::Atomic),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub write_consistency: WriteConsistency,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL is not set".to_string())?;

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .map_err(|_| "PORT must be a valid port number".to_string())?;

        let write_consistency = match std::env::var("WRITE_CONSISTENCY") {
            Ok(value) => WriteConsistency::parse(&value)
                .ok_or_else(|| format!("invalid WRITE_CONSISTENCY: {} (expected 'best-effort' or 'atomic')", value))?,
            Err(_) => WriteConsistency::BestEffort,
        };

        Ok(Self {
            database_url,
            port,
            write_consistency,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_write_consistency() {
        assert_eq!(WriteConsistency::parse("best-effort"), Some(WriteConsistency::BestEffort));
        assert_eq!(WriteConsistency::parse("Atomic"), Some(WriteConsistency::Atomic));
        assert_eq!(WriteConsistency::parse("eventual"), None);
    }
}
