//! Progressive simplification of free-text game names.
//!
//! Topics often carry more than the bare game title ("Doom (2016) - any%
//! filler http://..."). Searching for the full text rarely matches, so the
//! resolvers walk a sequence of increasingly simplified candidates until a
//! search hits.

use std::sync::LazyLock;

use regex::Regex;

/// Filters applied one after another to the last emitted candidate.
static QUERY_FILTERS: LazyLock<[Regex; 5]> = LazyLock::new(|| {
    [
        // urls
        Regex::new(r"http[^ )]+").unwrap(),
        // parenthesized asides
        Regex::new(r"\([^)]*\)").unwrap(),
        Regex::new(r"(?i)filler").unwrap(),
        // trailing " - ...", " + ...", " ~ ..."
        Regex::new(r" [-+~](?: .*|$)").unwrap(),
        // everything from the first separator
        Regex::new(r"[-+~:].*").unwrap(),
    ]
});

static DOUBLE_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" {2,}").unwrap());
static LAST_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" [^ ]+$").unwrap());

/// Collapse runs of spaces and trim.
pub fn cleanup_query(query: &str) -> String {
    DOUBLE_SPACE.replace_all(query, " ").trim().to_string()
}

pub struct QueryNormalizer;

impl QueryNormalizer {
    /// Lazily produce the candidate queries for `raw`.
    pub fn candidates(raw: &str) -> QueryCandidates {
        QueryCandidates::new(raw)
    }
}

#[derive(Debug, Clone)]
enum Stage {
    Initial,
    Filter(usize),
    WordCut,
    Done,
}

/// Iterator over progressively simplified queries.
///
/// Every candidate is strictly shorter than the previous one, so the
/// sequence is finite and never repeats.
#[derive(Debug, Clone)]
pub struct QueryCandidates {
    raw: String,
    last: String,
    stage: Stage,
}

impl QueryCandidates {
    fn new(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            last: String::new(),
            stage: Stage::Initial,
        }
    }

    /// Start over from the first candidate.
    pub fn restart(&mut self) {
        self.last.clear();
        self.stage = Stage::Initial;
    }

    fn emit(&mut self, candidate: String) -> Option<String> {
        self.last.clone_from(&candidate);
        Some(candidate)
    }
}

impl Iterator for QueryCandidates {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            match self.stage {
                Stage::Initial => {
                    self.stage = Stage::Filter(0);
                    let first = cleanup_query(&self.raw);
                    return self.emit(first);
                }
                Stage::Filter(index) => {
                    let Some(filter) = QUERY_FILTERS.get(index) else {
                        self.stage = Stage::WordCut;
                        continue;
                    };
                    self.stage = Stage::Filter(index + 1);
                    let option = cleanup_query(&filter.replace_all(&self.last, ""));
                    if option != self.last {
                        return self.emit(option);
                    }
                }
                Stage::WordCut => {
                    let option = LAST_WORD.replace(&self.last, "").into_owned();
                    if option == self.last {
                        self.stage = Stage::Done;
                        return None;
                    }
                    return self.emit(option);
                }
                Stage::Done => return None,
            }
        }
    }
}

impl std::iter::FusedIterator for QueryCandidates {}
