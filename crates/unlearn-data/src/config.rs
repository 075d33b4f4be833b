// Configuration — the flat option set and the forgetting mode parsed from it
//
// `LoaderOptions` mirrors the recognised options one to one and can be read
// from JSON. The combination of forgetting options is turned into a
// `ForgetSpec` exactly once, up front; invalid combinations are rejected
// there, before any dataset is loaded.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use unlearn_core::{Error, Result};

use crate::provider::ProviderOptions;

/// Which subset confuse mode hands to the model as the forget set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfuseSplit {
    /// Keep the confused samples as ordinary (mislabeled) training data.
    Train,
    /// Additionally forget the confused samples by index.
    Forget,
}

impl std::str::FromStr for ConfuseSplit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "train" => Ok(ConfuseSplit::Train),
            "forget" => Ok(ConfuseSplit::Forget),
            other => Err(Error::InvalidSplit(other.to_string())),
        }
    }
}

/// What to forget from the train partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForgetSpec {
    /// Leave the train partition as partitioned.
    None,
    /// Forget samples of `classes`: all of them, or `count` drawn at random.
    /// Forgetting whole classes also drops them from the test partition.
    ByClass {
        classes: Vec<i64>,
        count: Option<usize>,
    },
    /// Forget the samples at these train-partition positions.
    ByIndex { indexes: Vec<usize> },
    /// Confuse and forget the first half of a shuffle of each class.
    ClassConfusion { classes: [i64; 2] },
    /// Swap labels of `count / 2` samples of each class, then treat them per
    /// `split`.
    Confuse {
        classes: [i64; 2],
        count: usize,
        split: ConfuseSplit,
    },
}

impl ForgetSpec {
    /// Decide the forgetting mode from the flat options.
    pub fn from_options(options: &ForgetOptions) -> Result<Self> {
        if options.confuse_mode {
            let classes = options.class_to_replace.as_deref().unwrap_or_default();
            let classes: [i64; 2] = classes
                .try_into()
                .map_err(|_| Error::ConfuseNeedsTwoClasses { got: classes.len() })?;
            let count = options.num_indexes_to_replace.ok_or(Error::MissingCount)?;
            let split = options.split.parse()?;
            return Ok(ForgetSpec::Confuse {
                classes,
                count,
                split,
            });
        }

        match (&options.class_to_replace, &options.indexes_to_replace) {
            (Some(_), Some(_)) => Err(Error::ClassAndIndexes),
            (Some(classes), None) => Ok(ForgetSpec::ByClass {
                classes: classes.clone(),
                count: options.num_indexes_to_replace,
            }),
            (None, Some(indexes)) => Ok(ForgetSpec::ByIndex {
                indexes: indexes.clone(),
            }),
            (None, None) => Ok(ForgetSpec::None),
        }
    }
}

fn default_split() -> String {
    "train".to_string()
}

/// The forgetting-related options, as given by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForgetOptions {
    /// Classes to forget, or the pair to confuse.
    #[serde(default)]
    pub class_to_replace: Option<Vec<i64>>,
    /// How many samples to forget/confuse. Absent: all of the classes.
    #[serde(default)]
    pub num_indexes_to_replace: Option<usize>,
    /// Explicit train-partition positions to forget.
    #[serde(default)]
    pub indexes_to_replace: Option<Vec<usize>>,
    #[serde(default)]
    pub confuse_mode: bool,
    /// `train` or `forget`; only read in confuse mode.
    #[serde(default = "default_split")]
    pub split: String,
}

impl Default for ForgetOptions {
    fn default() -> Self {
        Self {
            class_to_replace: None,
            num_indexes_to_replace: None,
            indexes_to_replace: None,
            confuse_mode: false,
            split: default_split(),
        }
    }
}

fn default_seed() -> u64 {
    1
}

fn default_batch_size() -> usize {
    128
}

fn default_true() -> bool {
    true
}

/// Every option recognised by [`get_loaders`](crate::assemble::get_loaders).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoaderOptions {
    /// Registry key of the dataset.
    pub dataset_name: String,
    #[serde(flatten)]
    pub forget: ForgetOptions,
    /// Drives every random choice. Forgetting uses `seed - 1`.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Mark forgotten labels instead of replacing samples.
    #[serde(default)]
    pub only_mark: bool,
    /// Dataset root; defaults to `~/data`.
    #[serde(default)]
    pub root: Option<PathBuf>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Shuffle the train loader (validation and test never are).
    #[serde(default = "default_true")]
    pub shuffle: bool,
    #[serde(default)]
    pub num_workers: usize,
    #[serde(flatten)]
    pub provider: ProviderOptions,
}

impl LoaderOptions {
    pub fn new(dataset_name: impl Into<String>) -> Self {
        Self {
            dataset_name: dataset_name.into(),
            forget: ForgetOptions::default(),
            seed: default_seed(),
            only_mark: false,
            root: None,
            batch_size: default_batch_size(),
            shuffle: true,
            num_workers: 0,
            provider: ProviderOptions::default(),
        }
    }

    /// Parse options from a JSON object.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read options from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    pub fn class_to_replace(mut self, classes: Vec<i64>) -> Self {
        self.forget.class_to_replace = Some(classes);
        self
    }

    pub fn num_indexes_to_replace(mut self, n: usize) -> Self {
        self.forget.num_indexes_to_replace = Some(n);
        self
    }

    pub fn indexes_to_replace(mut self, indexes: Vec<usize>) -> Self {
        self.forget.indexes_to_replace = Some(indexes);
        self
    }

    pub fn confuse_mode(mut self, on: bool) -> Self {
        self.forget.confuse_mode = on;
        self
    }

    pub fn split(mut self, split: impl Into<String>) -> Self {
        self.forget.split = split.into();
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn only_mark(mut self, on: bool) -> Self {
        self.only_mark = on;
        self
    }

    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn batch_size(mut self, bs: usize) -> Self {
        self.batch_size = bs;
        self
    }

    pub fn shuffle(mut self, on: bool) -> Self {
        self.shuffle = on;
        self
    }

    pub fn num_workers(mut self, n: usize) -> Self {
        self.num_workers = n;
        self
    }

    pub fn augment(mut self, on: bool) -> Self {
        self.provider.augment = on;
        self
    }

    /// The dataset root, falling back to `~/data`.
    pub fn resolved_root(&self) -> Result<PathBuf> {
        match &self.root {
            Some(root) => Ok(root.clone()),
            None => dirs::home_dir()
                .map(|home| home.join("data"))
                .ok_or(Error::NoDataRoot),
        }
    }

    /// Seed used by every forgetting step.
    pub fn forget_seed(&self) -> u64 {
        self.seed.wrapping_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(options: ForgetOptions) -> Result<ForgetSpec> {
        ForgetSpec::from_options(&options)
    }

    #[test]
    fn test_plain() {
        assert_eq!(parse(ForgetOptions::default()).unwrap(), ForgetSpec::None);
    }

    #[test]
    fn test_by_class_and_by_index() {
        let by_class = ForgetOptions {
            class_to_replace: Some(vec![3]),
            num_indexes_to_replace: Some(10),
            ..Default::default()
        };
        assert_eq!(
            parse(by_class).unwrap(),
            ForgetSpec::ByClass {
                classes: vec![3],
                count: Some(10)
            }
        );

        let by_index = ForgetOptions {
            indexes_to_replace: Some(vec![1, 2]),
            ..Default::default()
        };
        assert_eq!(
            parse(by_index).unwrap(),
            ForgetSpec::ByIndex {
                indexes: vec![1, 2]
            }
        );
    }

    #[test]
    fn test_class_and_indexes_rejected() {
        let both = ForgetOptions {
            class_to_replace: Some(vec![0]),
            indexes_to_replace: Some(vec![1]),
            ..Default::default()
        };
        assert!(matches!(parse(both), Err(Error::ClassAndIndexes)));
    }

    #[test]
    fn test_confuse_mode() {
        let options = ForgetOptions {
            class_to_replace: Some(vec![1, 7]),
            num_indexes_to_replace: Some(20),
            confuse_mode: true,
            split: "forget".into(),
            ..Default::default()
        };
        assert_eq!(
            parse(options).unwrap(),
            ForgetSpec::Confuse {
                classes: [1, 7],
                count: 20,
                split: ConfuseSplit::Forget
            }
        );
    }

    #[test]
    fn test_confuse_mode_errors() {
        let three = ForgetOptions {
            class_to_replace: Some(vec![1, 2, 3]),
            num_indexes_to_replace: Some(4),
            confuse_mode: true,
            ..Default::default()
        };
        assert!(matches!(
            parse(three),
            Err(Error::ConfuseNeedsTwoClasses { got: 3 })
        ));

        let no_count = ForgetOptions {
            class_to_replace: Some(vec![1, 2]),
            confuse_mode: true,
            ..Default::default()
        };
        assert!(matches!(parse(no_count), Err(Error::MissingCount)));

        let bad_split = ForgetOptions {
            class_to_replace: Some(vec![1, 2]),
            num_indexes_to_replace: Some(4),
            confuse_mode: true,
            split: "test".into(),
            ..Default::default()
        };
        assert!(matches!(parse(bad_split), Err(Error::InvalidSplit(s)) if s == "test"));
    }

    #[test]
    fn test_json_defaults() {
        let options = LoaderOptions::from_json_str(r#"{"dataset_name": "synthetic10"}"#).unwrap();
        assert_eq!(options, LoaderOptions::new("synthetic10"));
        assert_eq!(options.seed, 1);
        assert_eq!(options.batch_size, 128);
        assert!(options.shuffle);
        assert_eq!(options.forget.split, "train");
        assert_eq!(options.forget_seed(), 0);
    }

    #[test]
    fn test_json_full() {
        let json = r#"{
            "dataset_name": "synthetic10",
            "class_to_replace": [4],
            "num_indexes_to_replace": 12,
            "seed": 7,
            "only_mark": true,
            "root": "/tmp/data",
            "batch_size": 32,
            "shuffle": false,
            "augment": true
        }"#;
        let options = LoaderOptions::from_json_str(json).unwrap();
        let expected = LoaderOptions::new("synthetic10")
            .class_to_replace(vec![4])
            .num_indexes_to_replace(12)
            .seed(7)
            .only_mark(true)
            .root("/tmp/data")
            .batch_size(32)
            .shuffle(false)
            .augment(true);
        assert_eq!(options, expected);
    }

    #[test]
    fn test_json_missing_name() {
        assert!(matches!(
            LoaderOptions::from_json_str("{}"),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn test_forget_seed_wraps() {
        assert_eq!(LoaderOptions::new("x").seed(0).forget_seed(), u64::MAX);
    }
}
