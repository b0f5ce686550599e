//! Per-stage configuration. Each stage gets one explicit `Config` value built
//! once from `std::env::args()` and threaded through; there is no process-wide
//! mutable state anywhere in this crate.

use std::path::PathBuf;

use crate::error::{Error, Result};

/// Logging verbosity: 0 (silent), 1 (milestones), 2 (per-chunk progress).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Verbosity(pub u8);

impl Verbosity {
    pub fn at_least(self, level: u8) -> bool {
        self.0 >= level
    }
}

/// Find `flag` in `args` and parse the following element.
fn find_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .map(|i| i + 1)
        .and_then(|i| args.get(i))
        .map(String::as_str)
}

fn parse_opt<T: std::str::FromStr>(args: &[String], flag: &str) -> Result<Option<T>> {
    match find_arg(args, flag) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| Error::InvalidArgument(format!("{flag} expects a number, got {raw:?}"))),
    }
}

#[derive(Clone, Debug)]
pub struct VocabConfig {
    pub verbose: Verbosity,
    pub max_vocab: Option<u64>,
    pub min_count: u64,
}

impl Default for VocabConfig {
    fn default() -> Self {
        VocabConfig {
            verbose: Verbosity(2),
            max_vocab: None,
            min_count: 1,
        }
    }
}

impl VocabConfig {
    pub fn from_args(args: &[String]) -> Result<Self> {
        let mut cfg = VocabConfig::default();
        if let Some(v) = parse_opt::<u8>(args, "-verbose")? {
            cfg.verbose = Verbosity(v);
        }
        if let Some(v) = parse_opt::<u64>(args, "-max-vocab")? {
            cfg.max_vocab = Some(v);
        }
        if let Some(v) = parse_opt::<u64>(args, "-min-count")? {
            cfg.min_count = v;
        }
        Ok(cfg)
    }
}

#[derive(Clone, Debug)]
pub struct CooccurConfig {
    pub verbose: Verbosity,
    pub symmetric: bool,
    pub window_size: usize,
    pub vocab_file: PathBuf,
    pub memory_gb: f64,
    pub max_product: Option<i64>,
    pub overflow_length: Option<i64>,
    pub overflow_file: String,
}

impl Default for CooccurConfig {
    fn default() -> Self {
        CooccurConfig {
            verbose: Verbosity(2),
            symmetric: true,
            window_size: 15,
            vocab_file: PathBuf::from("vocab.txt"),
            memory_gb: 3.0,
            max_product: None,
            overflow_length: None,
            overflow_file: "overflow".to_string(),
        }
    }
}

impl CooccurConfig {
    pub fn from_args(args: &[String]) -> Result<Self> {
        let mut cfg = CooccurConfig::default();
        if let Some(v) = parse_opt::<u8>(args, "-verbose")? {
            cfg.verbose = Verbosity(v);
        }
        if let Some(v) = parse_opt::<u8>(args, "-symmetric")? {
            cfg.symmetric = v != 0;
        }
        if let Some(v) = parse_opt::<usize>(args, "-window-size")? {
            cfg.window_size = v;
        }
        if let Some(v) = find_arg(args, "-vocab-file") {
            cfg.vocab_file = PathBuf::from(v);
        }
        if let Some(v) = parse_opt::<f64>(args, "-memory")? {
            cfg.memory_gb = v;
        }
        if let Some(v) = parse_opt::<i64>(args, "-max-product")? {
            cfg.max_product = Some(v);
        }
        if let Some(v) = parse_opt::<i64>(args, "-overflow-length")? {
            cfg.overflow_length = Some(v);
        }
        if let Some(v) = find_arg(args, "-overflow-file") {
            cfg.overflow_file = v.to_string();
        }
        Ok(cfg)
    }
}

#[derive(Clone, Debug)]
pub struct ShuffleConfig {
    pub verbose: Verbosity,
    pub memory_gb: f64,
    pub array_size: Option<i64>,
    pub temp_file: String,
}

impl Default for ShuffleConfig {
    fn default() -> Self {
        ShuffleConfig {
            verbose: Verbosity(2),
            memory_gb: 2.0,
            array_size: None,
            temp_file: "temp_shuffle".to_string(),
        }
    }
}

impl ShuffleConfig {
    pub fn from_args(args: &[String]) -> Result<Self> {
        let mut cfg = ShuffleConfig::default();
        if let Some(v) = parse_opt::<u8>(args, "-verbose")? {
            cfg.verbose = Verbosity(v);
        }
        if let Some(v) = parse_opt::<f64>(args, "-memory")? {
            cfg.memory_gb = v;
        }
        if let Some(v) = parse_opt::<i64>(args, "-array-size")? {
            cfg.array_size = Some(v);
        }
        if let Some(v) = find_arg(args, "-temp-file") {
            cfg.temp_file = v.to_string();
        }
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(s: &[&str]) -> Vec<String> {
        s.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn vocab_defaults() {
        let cfg = VocabConfig::from_args(&args(&[])).unwrap();
        assert_eq!(cfg.min_count, 1);
        assert_eq!(cfg.max_vocab, None);
        assert_eq!(cfg.verbose.0, 2);
    }

    #[test]
    fn vocab_overrides() {
        let cfg = VocabConfig::from_args(&args(&["-min-count", "5", "-max-vocab", "100"])).unwrap();
        assert_eq!(cfg.min_count, 5);
        assert_eq!(cfg.max_vocab, Some(100));
    }

    #[test]
    fn missing_value_is_invalid_argument() {
        let err = VocabConfig::from_args(&args(&["-min-count", "nope"])).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn cooccur_overrides() {
        let cfg = CooccurConfig::from_args(&args(&[
            "-symmetric",
            "0",
            "-window-size",
            "5",
            "-vocab-file",
            "v.txt",
        ]))
        .unwrap();
        assert!(!cfg.symmetric);
        assert_eq!(cfg.window_size, 5);
        assert_eq!(cfg.vocab_file, PathBuf::from("v.txt"));
    }

    #[test]
    fn shuffle_defaults() {
        let cfg = ShuffleConfig::from_args(&args(&[])).unwrap();
        assert_eq!(cfg.temp_file, "temp_shuffle");
        assert_eq!(cfg.memory_gb, 2.0);
    }
}
