// (c) Meta Platforms, Inc. and affiliates.
//
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use chrono::NaiveDateTime;

use crate::output as tv;
use crate::spec;
use tv::run_set::ExternalLink;
use tv::trait_ext::VecExt;

/// A test run set pulled into an evidence set.
#[derive(Debug, Clone, PartialEq)]
pub struct EvidenceSetSource {
    pub prefix: String,
    pub product: String,
    pub test_run_set_id: u64,
    pub selection_mode: spec::TestRunSelectionMode,
}

impl EvidenceSetSource {
    /// Selects every test run of the set, placed under `prefix`.
    pub fn all(prefix: &str, product: &str, test_run_set_id: u64) -> Self {
        EvidenceSetSource {
            prefix: prefix.to_owned(),
            product: product.to_owned(),
            test_run_set_id,
            selection_mode: spec::TestRunSelectionMode::All,
        }
    }

    fn to_artifact(&self) -> spec::EvidenceSetSource {
        spec::EvidenceSetSource {
            prefix: self.prefix.clone(),
            product: self.product.clone(),
            test_run_set_id: self.test_run_set_id,
            selection_mode: self.selection_mode,
        }
    }
}

/// Totals reported back once an evidence set has been created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvidenceSetSummary {
    pub id: u64,
    pub successful_tests: u64,
    pub failed_tests: u64,
    pub erroring_tests: u64,
}

impl EvidenceSetSummary {
    pub fn has_failures(&self) -> bool {
        self.failed_tests > 0 || self.erroring_tests > 0
    }
}

/// Description of an evidence set to be created on a [`tv::Product`].
#[derive(Debug, Clone)]
pub struct EvidenceSet {
    name: String,
    description: Option<String>,
    ref_date: Option<NaiveDateTime>,
    tags: Vec<String>,
    links: Vec<ExternalLink>,
    multiple_source_behaviour: spec::MultipleSourceTestRunsBehaviour,
    sources: Vec<EvidenceSetSource>,
}

impl EvidenceSet {
    pub fn builder(name: &str) -> EvidenceSetBuilder {
        EvidenceSetBuilder::new(name)
    }

    pub(crate) fn source_ids(&self) -> Vec<u64> {
        self.sources.iter().map(|s| s.test_run_set_id).collect()
    }

    pub(crate) fn to_artifact(
        &self,
        product: &str,
        summary: spec::EvidenceSetCounts,
    ) -> spec::EvidenceSetCreate {
        spec::EvidenceSetCreate {
            product: product.to_owned(),
            name: self.name.clone(),
            description: self.description.clone(),
            ref_date: self.ref_date,
            tags: self.tags.map_option(Clone::clone),
            links: self.links.map_option(ExternalLink::to_artifact),
            multiple_source_behaviour: self.multiple_source_behaviour,
            sources: self.sources.iter().map(EvidenceSetSource::to_artifact).collect(),
            summary,
        }
    }
}

pub struct EvidenceSetBuilder {
    name: String,
    description: Option<String>,
    ref_date: Option<NaiveDateTime>,
    tags: Vec<String>,
    links: Vec<ExternalLink>,
    multiple_source_behaviour: spec::MultipleSourceTestRunsBehaviour,
    sources: Vec<EvidenceSetSource>,
}

impl EvidenceSetBuilder {
    fn new(name: &str) -> Self {
        EvidenceSetBuilder {
            name: name.to_owned(),
            description: None,
            ref_date: None,
            tags: vec![],
            links: vec![],
            multiple_source_behaviour: spec::MultipleSourceTestRunsBehaviour::NotAllowed,
            sources: vec![],
        }
    }

    pub fn description(mut self, value: &str) -> Self {
        self.description = Some(value.to_owned());
        self
    }

    pub fn ref_date(mut self, value: NaiveDateTime) -> Self {
        self.ref_date = Some(value);
        self
    }

    pub fn add_tag(mut self, value: &str) -> Self {
        self.tags.push(value.to_owned());
        self
    }

    pub fn add_link(mut self, link: ExternalLink) -> Self {
        self.links.push(link);
        self
    }

    pub fn multiple_source_behaviour(
        mut self,
        value: spec::MultipleSourceTestRunsBehaviour,
    ) -> Self {
        self.multiple_source_behaviour = value;
        self
    }

    pub fn add_source(mut self, source: EvidenceSetSource) -> Self {
        self.sources.push(source);
        self
    }

    pub fn build(self) -> EvidenceSet {
        EvidenceSet {
            name: self.name,
            description: self.description,
            ref_date: self.ref_date,
            tags: self.tags,
            links: self.links,
            multiple_source_behaviour: self.multiple_source_behaviour,
            sources: self.sources,
        }
    }
}
