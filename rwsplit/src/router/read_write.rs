//! Default read/write splitting router.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rand::Rng;
use rwsplit_config::{General, LoadBalancingStrategy, ReadWriteStrategy};

use super::{Router, StatementContext};
use crate::error::Error;
use crate::topology::Topology;

/// Sends reads to replicas and everything else to the master.
///
/// Only looks at the leading keyword, it's not a SQL parser. Anything
/// it doesn't recognize as a read is treated as a write.
#[derive(Debug)]
pub struct ReadWriteRouter {
    topology: Arc<Topology>,
    lb_strategy: LoadBalancingStrategy,
    rw_strategy: ReadWriteStrategy,
    round_robin: AtomicUsize,
}

impl ReadWriteRouter {
    pub fn new(general: &General, topology: Arc<Topology>) -> Self {
        Self {
            topology,
            lb_strategy: general.load_balancing_strategy,
            rw_strategy: general.read_write_strategy,
            round_robin: AtomicUsize::new(0),
        }
    }

    fn replica(&self) -> &str {
        let replicas = self.topology.replicas();

        let index = match self.lb_strategy {
            LoadBalancingStrategy::Random => rand::rng().random_range(0..replicas.len()),
            LoadBalancingStrategy::RoundRobin => {
                self.round_robin.fetch_add(1, Ordering::Relaxed) % replicas.len()
            }
        };

        &replicas[index]
    }
}

impl Router for ReadWriteRouter {
    fn resolve_target(&self, context: &StatementContext<'_>) -> Result<String, Error> {
        let master = self.topology.master();

        if self.topology.replicas().is_empty() {
            return Ok(master.to_string());
        }

        if !context.autocommit && self.rw_strategy == ReadWriteStrategy::Conservative {
            return Ok(master.to_string());
        }

        if is_read(context.sql) {
            Ok(self.replica().to_string())
        } else {
            Ok(master.to_string())
        }
    }
}

/// Statement only reads data.
pub fn is_read(sql: &str) -> bool {
    let words = sql_words(sql);
    let Some(first) = words.first() else {
        return false;
    };

    match first.as_str() {
        "SELECT" => !locks_rows(&words),
        "SHOW" | "EXPLAIN" | "DESCRIBE" | "DESC" => true,
        "WITH" => {
            !locks_rows(&words)
                && !words
                    .iter()
                    .any(|w| matches!(w.as_str(), "INSERT" | "UPDATE" | "DELETE" | "MERGE"))
        }
        _ => false,
    }
}

/// SELECT ... FOR UPDATE / FOR SHARE need the master.
fn locks_rows(words: &[String]) -> bool {
    words.windows(2).any(|pair| {
        pair[0] == "FOR"
            && matches!(pair[1].as_str(), "UPDATE" | "SHARE" | "NO" | "KEY")
    })
}

/// Uppercased bare words, with comments and string literals skipped.
fn sql_words(sql: &str) -> Vec<String> {
    let mut words = vec![];
    let mut word = String::new();
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '-' if chars.peek() == Some(&'-') => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
            }
            '\'' | '"' => {
                for next in chars.by_ref() {
                    if next == c {
                        break;
                    }
                }
            }
            c if c.is_alphanumeric() || c == '_' => {
                word.push(c.to_ascii_uppercase());
                continue;
            }
            _ => (),
        }

        if !word.is_empty() {
            words.push(std::mem::take(&mut word));
        }
    }

    if !word.is_empty() {
        words.push(word);
    }

    words
}
