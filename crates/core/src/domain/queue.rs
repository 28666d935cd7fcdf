// Queue Domain Model
//
// A QueueList is the weighted, ordered list handed to the engine. A queue name
// repeated N times is N times as likely to be tried first by a processor.

use super::error::{DomainError, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Queue identifier
pub type QueueId = String;

/// Queue processed when no queue is configured
pub const DEFAULT_QUEUE: &str = "default";

/// Largest accepted weight; the list stores one entry per unit of weight
pub const MAX_QUEUE_WEIGHT: u32 = 1000;

/// Check that a queue name is usable in a `NAME[,WEIGHT]` spec
pub fn validate_queue_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains(',') || name.chars().any(char::is_whitespace) {
        return Err(DomainError::InvalidQueueName(name.to_string()));
    }
    Ok(())
}

/// One `-q NAME[,WEIGHT]` occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueSpec {
    name: QueueId,
    weight: u32,
}

impl QueueSpec {
    pub fn new(name: impl Into<String>, weight: u32) -> Result<Self> {
        let name = name.into();
        validate_queue_name(&name)?;
        if !(1..=MAX_QUEUE_WEIGHT).contains(&weight) {
            return Err(DomainError::InvalidQueueWeight {
                queue: name,
                weight: weight.to_string(),
            });
        }
        Ok(Self { name, weight })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn weight(&self) -> u32 {
        self.weight
    }
}

impl FromStr for QueueSpec {
    type Err = DomainError;

    /// Parse `NAME` or `NAME,WEIGHT`; an omitted or empty weight means 1
    fn from_str(s: &str) -> Result<Self> {
        let (name, weight) = match s.split_once(',') {
            Some((name, weight)) => (name.trim(), weight.trim()),
            None => (s.trim(), ""),
        };
        validate_queue_name(name)?;

        let weight = if weight.is_empty() {
            1
        } else {
            match weight.parse::<u32>() {
                Ok(w) if (1..=MAX_QUEUE_WEIGHT).contains(&w) => w,
                _ => {
                    return Err(DomainError::InvalidQueueWeight {
                        queue: name.to_string(),
                        weight: weight.to_string(),
                    })
                }
            }
        };

        Ok(Self {
            name: name.to_string(),
            weight,
        })
    }
}

impl fmt::Display for QueueSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.weight == 1 {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{},{}", self.name, self.weight)
        }
    }
}

/// Weighted queue list (repetition encodes weight, order is significant)
///
/// Starts seeded with [`DEFAULT_QUEUE`]. The first explicit spec replaces the
/// seed, later specs append.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QueueList {
    names: Vec<QueueId>,
    #[serde(skip)]
    seeded: bool,
}

impl Default for QueueList {
    fn default() -> Self {
        Self {
            names: vec![DEFAULT_QUEUE.to_string()],
            seeded: true,
        }
    }
}

impl QueueList {
    /// Build from specs in order of appearance; no specs keeps the default seed
    pub fn with_specs<'a>(specs: impl IntoIterator<Item = &'a QueueSpec>) -> Self {
        let mut list = Self::default();
        for spec in specs {
            list.push(spec);
        }
        list
    }

    /// Append `spec.name()` exactly `spec.weight()` times
    pub fn push(&mut self, spec: &QueueSpec) {
        if self.seeded {
            self.names.clear();
            self.seeded = false;
        }
        self.names
            .extend(std::iter::repeat(spec.name.clone()).take(spec.weight as usize));
    }

    pub fn as_slice(&self) -> &[QueueId] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Never true: a list always holds at least the seed
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// True while no explicit queue has been pushed
    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    /// Distinct queue names in first-occurrence order
    pub fn distinct(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for name in &self.names {
            if !seen.contains(&name.as_str()) {
                seen.push(name);
            }
        }
        seen
    }

    /// Order in which a processor should try the queues for one fetch.
    ///
    /// Shuffles the weighted list and keeps the first occurrence of each
    /// name, so heavier queues tend to come first.
    pub fn fetch_order<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<QueueId> {
        let mut shuffled = self.names.clone();
        shuffled.shuffle(rng);

        let mut order: Vec<QueueId> = Vec::with_capacity(shuffled.len());
        for name in shuffled {
            if !order.contains(&name) {
                order.push(name);
            }
        }
        order
    }
}

impl fmt::Display for QueueList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.names.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn spec(s: &str) -> QueueSpec {
        s.parse().unwrap()
    }

    #[test]
    fn test_default_list_is_seeded() {
        let list = QueueList::default();
        assert_eq!(list.as_slice(), &["default".to_string()]);
        assert!(list.is_seeded());
    }

    #[test]
    fn test_explicit_specs_replace_seed() {
        let specs = vec![spec("critical,3"), spec("low")];
        let list = QueueList::with_specs(&specs);

        assert_eq!(list.as_slice(), &["critical", "critical", "critical", "low"]);
        assert!(!list.is_seeded());
    }

    #[test]
    fn test_length_is_sum_of_weights() {
        let specs = vec![spec("a,2"), spec("b"), spec("c,5"), spec("a")];
        let list = QueueList::with_specs(&specs);

        let total: u32 = specs.iter().map(QueueSpec::weight).sum();
        assert_eq!(list.len(), total as usize);
        assert_eq!(list.distinct(), vec!["a", "b", "c"]);
        assert_eq!(&list.as_slice()[..3], &["a", "a", "b"]);
        assert_eq!(list.as_slice().last().map(String::as_str), Some("a"));
    }

    #[test]
    fn test_spec_parsing() {
        assert_eq!(spec("mail").weight(), 1);
        assert_eq!(spec("mail,").weight(), 1);
        assert_eq!(spec("mail,4").weight(), 4);
        assert_eq!(spec(" mail , 2 ").name(), "mail");
        assert_eq!(spec("mail,4").to_string(), "mail,4");
        assert_eq!(spec("mail,1").to_string(), "mail");
    }

    #[test]
    fn test_spec_rejects_bad_weight() {
        for input in ["mail,0", "mail,-1", "mail,abc", "mail,2,3"] {
            let err = input.parse::<QueueSpec>().unwrap_err();
            assert!(
                matches!(err, DomainError::InvalidQueueWeight { .. }),
                "{input} should be rejected, got {err:?}"
            );
        }
    }

    #[test]
    fn test_spec_rejects_oversized_weight() {
        let limit = format!("bulk,{}", MAX_QUEUE_WEIGHT);
        assert_eq!(spec(&limit).weight(), MAX_QUEUE_WEIGHT);

        for input in ["bulk,1001", "bulk,4294967295", "bulk,99999999999"] {
            assert!(matches!(
                input.parse::<QueueSpec>(),
                Err(DomainError::InvalidQueueWeight { .. })
            ));
        }
        assert!(QueueSpec::new("bulk", MAX_QUEUE_WEIGHT + 1).is_err());
    }

    #[test]
    fn test_spec_rejects_bad_name() {
        assert!(matches!(
            "".parse::<QueueSpec>(),
            Err(DomainError::InvalidQueueName(_))
        ));
        assert!(matches!(
            ",3".parse::<QueueSpec>(),
            Err(DomainError::InvalidQueueName(_))
        ));
        assert!(QueueSpec::new("two words", 1).is_err());
        assert!(QueueSpec::new("ok", 0).is_err());
    }

    #[test]
    fn test_fetch_order_visits_each_queue_once() {
        let list = QueueList::with_specs(&[spec("a,3"), spec("b,2"), spec("c")]);
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..50 {
            let mut order = list.fetch_order(&mut rng);
            assert_eq!(order.len(), 3);
            order.sort();
            assert_eq!(order, vec!["a", "b", "c"]);
        }
    }

    #[test]
    fn test_fetch_order_respects_weight() {
        let list = QueueList::with_specs(&[spec("heavy,3"), spec("light")]);
        let mut rng = StdRng::seed_from_u64(42);

        let rounds = 4000;
        let heavy_first = (0..rounds)
            .filter(|_| list.fetch_order(&mut rng)[0] == "heavy")
            .count();

        // Expected ratio is 3/4
        let ratio = heavy_first as f64 / rounds as f64;
        assert!(ratio > 0.65 && ratio < 0.85, "ratio was {ratio}");
    }
}
