//! Oracle-driven relevance selection over candidate paths

use crate::oracle::parse::parse_path_list;
use crate::oracle::Oracle;
use crate::paths::{is_valid_path, CandidatePath, ROOT_PATH};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, warn};

/// Facts the enrichment run is looking for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InformationNeed {
    SoftwareClassification,
    EnterpriseGrade,
    Industry,
    Customers,
    EmployeeCount,
    Investors,
    Geography,
    ParentCompany,
    Address,
    Finance,
    Email,
    Phone,
}

impl InformationNeed {
    pub const ALL: [InformationNeed; 12] = [
        Self::SoftwareClassification,
        Self::EnterpriseGrade,
        Self::Industry,
        Self::Customers,
        Self::EmployeeCount,
        Self::Investors,
        Self::Geography,
        Self::ParentCompany,
        Self::Address,
        Self::Finance,
        Self::Email,
        Self::Phone,
    ];

    /// Question wording used in prompts
    pub fn question(&self) -> &'static str {
        match self {
            Self::SoftwareClassification => "Software classification of company",
            Self::EnterpriseGrade => "Is company \"enterprise grade\" or \"SMB\"",
            Self::Industry => "Industry of company",
            Self::Customers => "Customer/client name list",
            Self::EmployeeCount => "Employee head count",
            Self::Investors => "Investors list",
            Self::Geography => "Geography",
            Self::ParentCompany => "Parent company",
            Self::Address => "Address of company",
            Self::Finance => "Finance",
            Self::Email => "Email",
            Self::Phone => "Phone number",
        }
    }
}

/// What the candidate pool is made of; only changes prompt wording
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolKind {
    Sitemaps,
    Pages,
}

impl PoolKind {
    fn noun(&self) -> &'static str {
        match self {
            PoolKind::Sitemaps => "sitemap URLs",
            PoolKind::Pages => "URLs",
        }
    }
}

/// Outcome of one selection round
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Usable paths, in oracle order
    Paths(Vec<CandidatePath>),
    /// The oracle answered with the homepage sentinel first
    HomepageOnly,
    /// Empty, malformed or failed response
    Unusable,
}

impl Selection {
    /// Interpret a raw oracle answer
    ///
    /// Only an answer whose first entry is a valid non-root path is usable;
    /// later invalid entries are dropped.
    pub fn from_response(text: &str) -> Self {
        let entries = parse_path_list(text);
        if !gate_passes(&entries) {
            return match entries.first().map(String::as_str) {
                Some(ROOT_PATH) => Selection::HomepageOnly,
                _ => Selection::Unusable,
            };
        }

        let mut paths: Vec<CandidatePath> = Vec::new();
        for entry in &entries {
            match CandidatePath::parse(entry) {
                Some(path) if !paths.contains(&path) => paths.push(path),
                Some(_) => {}
                None => debug!("Dropping invalid selected path: {:?}", entry),
            }
        }
        Selection::Paths(paths)
    }

    pub fn passes_gate(&self) -> bool {
        matches!(self, Selection::Paths(_))
    }

    /// Selected paths, empty when the gate failed
    pub fn paths(&self) -> &[CandidatePath] {
        match self {
            Selection::Paths(paths) => paths,
            _ => &[],
        }
    }

    pub fn into_paths(self) -> Vec<CandidatePath> {
        match self {
            Selection::Paths(paths) => paths,
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::Paths(paths) => write!(f, "{} paths", paths.len()),
            Selection::HomepageOnly => f.write_str("homepage only"),
            Selection::Unusable => f.write_str("unusable"),
        }
    }
}

/// Acceptance test for a parsed oracle list
///
/// Non-empty, first entry a valid path, first entry not the homepage.
pub fn gate_passes(entries: &[String]) -> bool {
    entries
        .first()
        .is_some_and(|first| is_valid_path(first) && first != ROOT_PATH)
}

/// Chooses the candidate paths most likely to answer the information needs
pub struct PathRelevanceSelector<'a> {
    oracle: &'a dyn Oracle,
    needs: &'a [InformationNeed],
    max_candidates: usize,
}

impl<'a> PathRelevanceSelector<'a> {
    pub fn new(oracle: &'a dyn Oracle, needs: &'a [InformationNeed], max_candidates: usize) -> Self {
        Self {
            oracle,
            needs,
            max_candidates,
        }
    }

    /// Run one selection round over `candidates`
    ///
    /// Oracle failures and empty pools are [`Selection::Unusable`].
    pub async fn select<S: AsRef<str>>(&self, candidates: &[S], kind: PoolKind) -> Selection {
        if candidates.is_empty() {
            debug!("No {} to select from", kind.noun());
            return Selection::Unusable;
        }

        let prompt = self.prompt(candidates, kind);
        let selection = match self.oracle.generate(&prompt).await {
            Ok(text) => Selection::from_response(&text),
            Err(e) => {
                warn!("Path selection failed: {}", e);
                Selection::Unusable
            }
        };

        match &selection {
            Selection::Paths(_) => info!(
                "Selected {} from {} {}",
                selection,
                candidates.len(),
                kind.noun()
            ),
            Selection::HomepageOnly => info!("Oracle found no relevant {}", kind.noun()),
            Selection::Unusable => warn!("Oracle gave an unusable answer for {}", kind.noun()),
        }
        selection
    }

    fn prompt<S: AsRef<str>>(&self, candidates: &[S], kind: PoolKind) -> String {
        if candidates.len() > self.max_candidates {
            debug!(
                "Truncating {} candidates to {}",
                candidates.len(),
                self.max_candidates
            );
        }

        let questions: String = self
            .needs
            .iter()
            .enumerate()
            .map(|(i, need)| format!("{}. {}\n", i + 1, need.question()))
            .collect();
        let listing = candidates
            .iter()
            .take(self.max_candidates)
            .map(|c| c.as_ref())
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "To answer these questions, which {noun} would you require:\n\
             {questions}\n\
             Available {noun}:\n\
             {listing}\n\n\
             If English URLs are available, don't pick other language URLs.\n\
             If nothing relevant is found, return just the homepage path \"/\".\n\
             Return ONLY the paths as comma separated values, without any explanation or other text.",
            noun = kind.noun(),
        )
    }
}
