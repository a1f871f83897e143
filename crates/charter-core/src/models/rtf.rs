//! Role/Task/Format structure: the parsed form of a natural-language request.
//!
//! Model output is never trusted directly. It is deserialized into the
//! all-optional `Raw*` shapes first and then folded into [`RtfStructure`] by
//! [`RtfStructure::from_raw`], which fills every required field.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Persona used when the request does not name one.
pub const DEFAULT_ROLE: &str = "helpful assistant";

/// Confidence substituted for missing or out-of-range values.
pub const DEFAULT_CONFIDENCE: f64 = 0.7;

/// Confidence reported by the heuristic fallback.
pub const FALLBACK_CONFIDENCE: f64 = 0.3;

const FALLBACK_KEYWORD_COUNT: usize = 5;
const INTENT_MAX_CHARS: usize = 100;

/// Category of work a request asks for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TaskType {
    #[default]
    General,
    Paper,
    Document,
    Presentation,
    Research,
    Analysis,
    Code,
    Design,
    Planning,
    Communication,
}

impl FromStr for TaskType {
    type Err = String;

    /// Lenient: models describe the same category many ways
    /// ("paper_writing", "academic paper", "Slide deck").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.to_lowercase();
        let has = |needles: &[&str]| needles.iter().any(|n| s.contains(n));

        let task_type = if s.trim().is_empty() || s.trim() == "general" {
            TaskType::General
        } else if has(&["paper", "essay", "article", "thesis"]) {
            TaskType::Paper
        } else if has(&["presentation", "slide", "deck"]) {
            TaskType::Presentation
        } else if has(&["document", "report", "writing", "doc"]) {
            TaskType::Document
        } else if has(&["research", "investigat"]) {
            TaskType::Research
        } else if has(&["analy", "evaluat"]) {
            TaskType::Analysis
        } else if has(&["code", "program", "software", "develop", "implement"]) {
            TaskType::Code
        } else if has(&["design"]) {
            TaskType::Design
        } else if has(&["plan", "schedul"]) {
            TaskType::Planning
        } else if has(&["communicat", "email", "message", "outreach"]) {
            TaskType::Communication
        } else {
            return Err(format!("Unrecognized task type: {s}"));
        };
        Ok(task_type)
    }
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::General => "general",
            TaskType::Paper => "paper",
            TaskType::Document => "document",
            TaskType::Presentation => "presentation",
            TaskType::Research => "research",
            TaskType::Analysis => "analysis",
            TaskType::Code => "code",
            TaskType::Design => "design",
            TaskType::Planning => "planning",
            TaskType::Communication => "communication",
        }
    }

    /// Papers, documents and presentations.
    pub fn is_document_family(&self) -> bool {
        matches!(
            self,
            TaskType::Paper | TaskType::Document | TaskType::Presentation
        )
    }

    /// Output type implied by the category when the model gives none.
    pub fn default_output_type(&self) -> &'static str {
        match self {
            TaskType::Paper | TaskType::Document => "document",
            TaskType::Presentation => "presentation",
            TaskType::Code => "code",
            TaskType::Analysis | TaskType::Research => "report",
            TaskType::Planning => "plan",
            _ => "text",
        }
    }
}

/// How much coordination a task needs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TaskScope {
    #[default]
    SingleAction,
    MultiStep,
    Iterative,
    Collaborative,
}

impl FromStr for TaskScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['_', ' '], "-").as_str() {
            "single-action" | "single" => Ok(TaskScope::SingleAction),
            "multi-step" | "multistep" => Ok(TaskScope::MultiStep),
            "iterative" => Ok(TaskScope::Iterative),
            "collaborative" => Ok(TaskScope::Collaborative),
            _ => Err(format!("Invalid task scope: {s}")),
        }
    }
}

impl TaskScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskScope::SingleAction => "single-action",
            TaskScope::MultiStep => "multi-step",
            TaskScope::Iterative => "iterative",
            TaskScope::Collaborative => "collaborative",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().trim() {
            "low" => Ok(Priority::Low),
            "medium" | "normal" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "urgent" | "critical" => Ok(Priority::Urgent),
            _ => Err(format!("Invalid priority: {s}")),
        }
    }
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Complexity {
    Simple,
    #[default]
    Moderate,
    Complex,
    VeryComplex,
}

impl FromStr for Complexity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['_', ' '], "-").as_str() {
            "simple" | "low" => Ok(Complexity::Simple),
            "moderate" | "medium" => Ok(Complexity::Moderate),
            "complex" | "high" => Ok(Complexity::Complex),
            "very-complex" | "verycomplex" => Ok(Complexity::VeryComplex),
            _ => Err(format!("Invalid complexity: {s}")),
        }
    }
}

impl Complexity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Simple => "simple",
            Complexity::Moderate => "moderate",
            Complexity::Complex => "complex",
            Complexity::VeryComplex => "very-complex",
        }
    }

    /// Rough estimate from the length of the request.
    pub fn estimate(input: &str) -> Self {
        match input.split_whitespace().count() {
            0..=14 => Complexity::Simple,
            15..=49 => Complexity::Moderate,
            50..=149 => Complexity::Complex,
            _ => Complexity::VeryComplex,
        }
    }
}

/// What the request wants done.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub intent: String,
    pub description: String,
    pub scope: TaskScope,
    pub priority: Priority,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub constraints: Vec<String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    pub expected_outcome: String,
}

impl Task {
    /// Minimal task derived from the raw input alone.
    pub fn from_input(input: &str) -> Self {
        Self {
            task_type: TaskType::General,
            intent: summarize(input),
            description: input.to_string(),
            scope: TaskScope::SingleAction,
            priority: Priority::Medium,
            requirements: Vec::new(),
            constraints: Vec::new(),
            dependencies: Vec::new(),
            expected_outcome: "A response that addresses the request".to_string(),
        }
    }
}

/// One concrete artifact the request expects.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Deliverable {
    pub name: String,
    #[serde(rename = "type")]
    pub deliverable_type: String,
    pub description: String,
    pub format: String,
    pub priority: Priority,
}

/// How the result should be shaped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Format {
    pub output_type: String,
    pub structure: String,
    pub style: String,
    #[serde(default)]
    pub deliverables: Vec<Deliverable>,
    pub timeline: String,
}

impl Format {
    /// Minimal format implied by the task category.
    pub fn for_task(task_type: TaskType) -> Self {
        Self {
            output_type: task_type.default_output_type().to_string(),
            structure: "freeform".to_string(),
            style: "clear and concise".to_string(),
            deliverables: Vec::new(),
            timeline: "unspecified".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RtfMetadata {
    pub language: String,
    pub complexity: Complexity,
    pub domain: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Set when the structure was produced by local heuristics only
    #[serde(default)]
    pub fallback: bool,
}

impl RtfMetadata {
    fn from_input(input: &str) -> Self {
        Self {
            language: "en".to_string(),
            complexity: Complexity::estimate(input),
            domain: "general".to_string(),
            keywords: leading_keywords(input),
            fallback: false,
        }
    }
}

/// Canonical structured intent.
///
/// `task` and `format` are always populated and `confidence` is always in
/// `[0, 1]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RtfStructure {
    pub role: String,
    pub task: Task,
    pub format: Format,
    pub confidence: f64,
    pub metadata: RtfMetadata,
}

impl RtfStructure {
    /// Fold untrusted model output into a complete structure.
    pub fn from_raw(raw: RawRtf, input: &str) -> Self {
        let role = non_empty(raw.role).unwrap_or_else(|| DEFAULT_ROLE.to_string());

        let task = match raw.task {
            Some(raw_task) => raw_task.into_task(input),
            None => Task::from_input(input),
        };

        let format = match raw.format {
            Some(raw_format) => raw_format.into_format(task.task_type),
            None => Format::for_task(task.task_type),
        };

        let metadata = match raw.metadata {
            Some(raw_meta) => raw_meta.into_metadata(input),
            None => RtfMetadata::from_input(input),
        };

        Self {
            role,
            task,
            format,
            confidence: clamp_confidence(raw.confidence),
            metadata,
        }
    }

    /// Structure built entirely from local heuristics.
    pub fn fallback(input: &str) -> Self {
        let task = Task::from_input(input);
        let format = Format::for_task(task.task_type);
        let mut metadata = RtfMetadata::from_input(input);
        metadata.fallback = true;

        Self {
            role: DEFAULT_ROLE.to_string(),
            task,
            format,
            confidence: FALLBACK_CONFIDENCE,
            metadata,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.metadata.fallback
    }
}

/// Model output for an RTF extraction, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawRtf {
    pub role: Option<String>,
    pub task: Option<RawTask>,
    pub format: Option<RawFormat>,
    pub confidence: Option<f64>,
    pub metadata: Option<RawMetadata>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawTask {
    #[serde(rename = "type")]
    pub task_type: Option<String>,
    pub intent: Option<String>,
    pub description: Option<String>,
    pub scope: Option<String>,
    pub priority: Option<String>,
    pub requirements: Vec<String>,
    pub constraints: Vec<String>,
    pub dependencies: Vec<String>,
    pub expected_outcome: Option<String>,
}

impl RawTask {
    fn into_task(self, input: &str) -> Task {
        let defaults = Task::from_input(input);
        Task {
            task_type: parse_or(self.task_type.as_deref(), defaults.task_type),
            intent: non_empty(self.intent).unwrap_or(defaults.intent),
            description: non_empty(self.description).unwrap_or(defaults.description),
            scope: parse_or(self.scope.as_deref(), defaults.scope),
            priority: parse_or(self.priority.as_deref(), defaults.priority),
            requirements: clean_list(self.requirements),
            constraints: clean_list(self.constraints),
            dependencies: clean_list(self.dependencies),
            expected_outcome: non_empty(self.expected_outcome)
                .unwrap_or(defaults.expected_outcome),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawDeliverable {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub deliverable_type: Option<String>,
    pub description: Option<String>,
    pub format: Option<String>,
    pub priority: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawFormat {
    pub output_type: Option<String>,
    pub structure: Option<String>,
    pub style: Option<String>,
    pub deliverables: Vec<RawDeliverable>,
    pub timeline: Option<String>,
}

impl RawFormat {
    fn into_format(self, task_type: TaskType) -> Format {
        let defaults = Format::for_task(task_type);
        let deliverables = self
            .deliverables
            .into_iter()
            .filter_map(|d| {
                let name = non_empty(d.name)?;
                Some(Deliverable {
                    deliverable_type: non_empty(d.deliverable_type)
                        .unwrap_or_else(|| defaults.output_type.clone()),
                    description: non_empty(d.description).unwrap_or_else(|| name.clone()),
                    format: non_empty(d.format).unwrap_or_else(|| "text".to_string()),
                    priority: parse_or(d.priority.as_deref(), Priority::Medium),
                    name,
                })
            })
            .collect();

        Format {
            output_type: non_empty(self.output_type).unwrap_or(defaults.output_type),
            structure: non_empty(self.structure).unwrap_or(defaults.structure),
            style: non_empty(self.style).unwrap_or(defaults.style),
            deliverables,
            timeline: non_empty(self.timeline).unwrap_or(defaults.timeline),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawMetadata {
    pub language: Option<String>,
    pub complexity: Option<String>,
    pub domain: Option<String>,
    pub keywords: Vec<String>,
}

impl RawMetadata {
    fn into_metadata(self, input: &str) -> RtfMetadata {
        let defaults = RtfMetadata::from_input(input);
        let keywords = clean_list(self.keywords);
        RtfMetadata {
            language: non_empty(self.language).unwrap_or(defaults.language),
            complexity: parse_or(self.complexity.as_deref(), defaults.complexity),
            domain: non_empty(self.domain).unwrap_or(defaults.domain),
            keywords: if keywords.is_empty() {
                defaults.keywords
            } else {
                keywords
            },
            fallback: false,
        }
    }
}

/// Clamp-or-default for self-reported confidence.
pub fn clamp_confidence(value: Option<f64>) -> f64 {
    match value {
        Some(c) if c.is_finite() && (0.0..=1.0).contains(&c) => c,
        _ => DEFAULT_CONFIDENCE,
    }
}

/// First whitespace-delimited tokens of the input.
pub fn leading_keywords(input: &str) -> Vec<String> {
    input
        .split_whitespace()
        .take(FALLBACK_KEYWORD_COUNT)
        .map(str::to_string)
        .collect()
}

/// First line of the input, cut at a char boundary.
pub fn summarize(input: &str) -> String {
    let line = input.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    let line = line.trim();
    if line.chars().count() <= INTENT_MAX_CHARS {
        line.to_string()
    } else {
        let cut: String = line.chars().take(INTENT_MAX_CHARS).collect();
        format!("{}...", cut.trim_end())
    }
}

pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn parse_or<T: FromStr>(value: Option<&str>, default: T) -> T {
    value.and_then(|v| v.parse().ok()).unwrap_or(default)
}

pub(crate) fn clean_list(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        let item = item.trim();
        if !item.is_empty() && !out.iter().any(|o| o == item) {
            out.push(item.to_string());
        }
    }
    out
}
