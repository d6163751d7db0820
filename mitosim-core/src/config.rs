//! Reads the run configuration from a `key=value` text file.
//!
//! The original distinguishes a missing key from a present-but-wrong one
//! only by comparing against an "obviously wrong" sentinel (`zerohuge`/
//! `onehuge`). Here a missing or malformed key is a typed
//! [`crate::error::MitosimError::InvalidConfig`] instead — every key is
//! mandatory, and a bad config simply refuses to start a run rather than
//! silently loading a sentinel value, the same observable effect with a
//! clearer failure path.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{MitosimError, Result};

/// Full set of parameters read from `config_<configSuffix>.txt`.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Total simulated time to run for.
    pub time_total: f64,
    /// Iterations between progress log lines.
    pub log_frequency: u64,
    /// Iterations between snapshot writes.
    pub save_frequency: u64,

    /// Physical length, in micrometers, represented by one edge.
    pub edge_length: f64,
    /// Total initial edge count across every segment.
    pub mtmassini: usize,
    /// Initial per-segment edge count.
    pub segmassini: usize,

    /// Whether fission is an active rule.
    pub use_fission: bool,
    /// Fission base rate.
    pub rate_fission: f64,

    /// Whether tip-to-tip fusion is an active rule.
    pub use_11_fusion: bool,
    /// Tip-to-tip fusion rate.
    pub fusion_rate_11: f64,
    /// Whether tip-to-side fusion is an active rule.
    pub use_12_fusion: bool,
    /// Tip-to-side fusion rate.
    pub fusion_rate_12: f64,
    /// Whether tip-to-loop fusion is an active rule.
    pub use_1l_fusion: bool,
    /// Tip-to-loop fusion rate.
    pub fusion_rate_1l: f64,
}

impl Config {
    /// Reads `<working_dir>/config_<config_suffix>.txt`.
    ///
    /// # Errors
    /// Returns [`MitosimError::Io`] if the file cannot be read, or
    /// [`MitosimError::InvalidConfig`] if a mandatory key is missing or
    /// fails to parse.
    pub fn read(working_dir: &Path, config_suffix: &str) -> Result<Self> {
        let path = working_dir.join(format!("config_{config_suffix}.txt"));
        let text = std::fs::read_to_string(&path).map_err(|source| MitosimError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Parses the key=value text directly; exposed for tests so they
    /// need not touch the filesystem for well-formed input.
    ///
    /// # Errors
    /// Returns [`MitosimError::InvalidConfig`] if a mandatory key is
    /// missing, fails to parse, or falls outside the range the driver
    /// requires to run safely (see [`Self::validate`]).
    pub fn parse(text: &str) -> Result<Self> {
        let entries = Self::entries(text);
        let reader = Reader { entries };
        let config = Self {
            time_total: reader.real("timeTotal")?,
            log_frequency: reader.count("logFrequency")?,
            save_frequency: reader.count("saveFrequency")?,
            edge_length: reader.real("edgeLength")?,
            mtmassini: reader.count("mtmassini")? as usize,
            segmassini: reader.count("segmassini")? as usize,
            use_fission: reader.boolean("use_fission")?,
            rate_fission: reader.real("rate_fission")?,
            use_11_fusion: reader.boolean("use_11_fusion")?,
            fusion_rate_11: reader.real("fusion_rate_11")?,
            use_12_fusion: reader.boolean("use_12_fusion")?,
            fusion_rate_12: reader.real("fusion_rate_12")?,
            use_1l_fusion: reader.boolean("use_1L_fusion")?,
            fusion_rate_1l: reader.real("fusion_rate_1L")?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Rejects configurations that would otherwise panic the driver
    /// (a zero `logFrequency`/`saveFrequency` divides the iteration
    /// counter by zero; a zero `mtmassini`/`segmassini` divides by zero
    /// while seeding the initial structure) or describe a nonsensical
    /// run (negative `timeTotal` or a negative rate).
    fn validate(&self) -> Result<()> {
        let checks: [(&str, bool, &str); 9] = [
            ("logFrequency", self.log_frequency >= 1, "must be at least 1"),
            ("saveFrequency", self.save_frequency >= 1, "must be at least 1"),
            ("mtmassini", self.mtmassini >= 1, "must be at least 1"),
            ("segmassini", self.segmassini >= 1, "must be at least 1"),
            ("timeTotal", self.time_total >= 0.0, "must not be negative"),
            ("rate_fission", self.rate_fission >= 0.0, "must not be negative"),
            ("fusion_rate_11", self.fusion_rate_11 >= 0.0, "must not be negative"),
            ("fusion_rate_12", self.fusion_rate_12 >= 0.0, "must not be negative"),
            ("fusion_rate_1L", self.fusion_rate_1l >= 0.0, "must not be negative"),
        ];
        for (key, ok, reason) in checks {
            if !ok {
                return Err(MitosimError::InvalidConfig { key: key.to_owned(), reason: reason.to_owned() });
            }
        }
        Ok(())
    }

    /// Splits `text` into key=value pairs, skipping blank lines and
    /// `#`-comments.
    fn entries(text: &str) -> HashMap<String, String> {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| line.split_once('='))
            .map(|(k, v)| (k.trim().to_owned(), v.trim().to_owned()))
            .collect()
    }
}

/// Looks a key up and reports a typed error on absence or parse failure.
struct Reader {
    entries: HashMap<String, String>,
}

impl Reader {
    fn raw(&self, key: &str) -> Result<&str> {
        self.entries
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| MitosimError::InvalidConfig {
                key: key.to_owned(),
                reason: "missing key".to_owned(),
            })
    }

    fn real(&self, key: &str) -> Result<f64> {
        let raw = self.raw(key)?;
        raw.parse().map_err(|_| MitosimError::InvalidConfig {
            key: key.to_owned(),
            reason: format!("`{raw}` is not a valid floating-point number"),
        })
    }

    fn count(&self, key: &str) -> Result<u64> {
        let raw = self.raw(key)?;
        raw.parse().map_err(|_| MitosimError::InvalidConfig {
            key: key.to_owned(),
            reason: format!("`{raw}` is not a valid non-negative integer"),
        })
    }

    fn boolean(&self, key: &str) -> Result<bool> {
        let raw = self.raw(key)?;
        match raw {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(MitosimError::InvalidConfig {
                key: key.to_owned(),
                reason: format!("`{raw}` is not a valid boolean (expected true/false/1/0)"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> String {
        "\
# sample config
timeTotal=100.0
logFrequency=10
saveFrequency=100
edgeLength=0.1
mtmassini=64
segmassini=4
use_fission=true
rate_fission=0.5
use_11_fusion=true
fusion_rate_11=1.0
use_12_fusion=false
fusion_rate_12=0.0
use_1L_fusion=true
fusion_rate_1L=0.2
"
        .to_owned()
    }

    #[test]
    fn parses_a_well_formed_config() {
        let cfg = Config::parse(&sample()).unwrap();
        assert_eq!(cfg.mtmassini, 64);
        assert_eq!(cfg.segmassini, 4);
        assert!(cfg.use_fission);
        assert!(!cfg.use_12_fusion);
        assert_eq!(cfg.fusion_rate_1l, 0.2);
    }

    #[test]
    fn missing_key_is_a_typed_error() {
        let text = sample().replace("timeTotal=100.0\n", "");
        let err = Config::parse(&text).unwrap_err();
        assert_eq!(err.code(), crate::error::MitosimErrorCode::InvalidConfig);
    }

    #[test]
    fn malformed_boolean_is_a_typed_error() {
        let text = sample().replace("use_fission=true", "use_fission=yes");
        let err = Config::parse(&text).unwrap_err();
        assert_eq!(err.code(), crate::error::MitosimErrorCode::InvalidConfig);
    }

    #[test]
    fn zero_log_frequency_is_a_typed_error() {
        let text = sample().replace("logFrequency=10", "logFrequency=0");
        let err = Config::parse(&text).unwrap_err();
        assert_eq!(err.code(), crate::error::MitosimErrorCode::InvalidConfig);
    }

    #[test]
    fn zero_save_frequency_is_a_typed_error() {
        let text = sample().replace("saveFrequency=100", "saveFrequency=0");
        let err = Config::parse(&text).unwrap_err();
        assert_eq!(err.code(), crate::error::MitosimErrorCode::InvalidConfig);
    }

    #[test]
    fn zero_mtmassini_is_a_typed_error() {
        let text = sample().replace("mtmassini=64", "mtmassini=0");
        let err = Config::parse(&text).unwrap_err();
        assert_eq!(err.code(), crate::error::MitosimErrorCode::InvalidConfig);
    }

    #[test]
    fn zero_segmassini_is_a_typed_error() {
        let text = sample().replace("segmassini=4", "segmassini=0");
        let err = Config::parse(&text).unwrap_err();
        assert_eq!(err.code(), crate::error::MitosimErrorCode::InvalidConfig);
    }

    #[test]
    fn negative_time_total_is_a_typed_error() {
        let text = sample().replace("timeTotal=100.0", "timeTotal=-1.0");
        let err = Config::parse(&text).unwrap_err();
        assert_eq!(err.code(), crate::error::MitosimErrorCode::InvalidConfig);
    }

    #[test]
    fn negative_rate_is_a_typed_error() {
        let text = sample().replace("rate_fission=0.5", "rate_fission=-0.5");
        let err = Config::parse(&text).unwrap_err();
        assert_eq!(err.code(), crate::error::MitosimErrorCode::InvalidConfig);
    }
}
