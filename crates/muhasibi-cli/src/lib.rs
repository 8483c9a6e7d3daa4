//! Offline CLI driver for the Muḥāsibī pipeline.
//!
//! The real retrieval store and foundation-model provider are out of
//! scope by design; this crate wires the bundled fixture
//! corpus (`muhasibi_retrieval::fixtures::bundled_catalog`) and the
//! deterministic [`muhasibi_model::FixtureModelClient`] behind the same
//! ports a production deployment would fill with a real store and model
//! provider, so a question can be driven through all eight stages from a
//! terminal without any external dependency.

#![forbid(unsafe_code)]

use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};

use muhasibi_core::config::Config;
use muhasibi_core::error::Error;
use muhasibi_core::models::{FinalResponse, Mode};
use muhasibi_model::FixtureModelClient;
use muhasibi_pipeline::{run_pipeline, InMemoryTraceSink};
use muhasibi_retrieval::{fixtures::bundled_catalog, Catalog, FixtureRetrieval};

/// `mhsb` — ask the bundled wellbeing-framework corpus a question.
#[derive(Parser, Debug)]
#[command(name = "mhsb", version, about = "Offline driver for the Muhasibi evidence-bound QA pipeline")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one question through the eight-stage pipeline and print the response.
    Ask {
        /// The Arabic question.
        question: String,

        /// Answer voice (modes table).
        #[arg(long, value_enum, default_value_t = ModeArg::Answer)]
        mode: ModeArg,

        /// Print the full Final Response as JSON instead of a formatted summary.
        #[arg(long)]
        json: bool,

        /// Also print the redacted state-transition trace.
        #[arg(long)]
        trace: bool,
    },
    /// Run the six literal scenario questions that exercise the
    /// engine's determinism properties and print a pass/fail summary for each.
    Demo,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum ModeArg {
    #[default]
    Answer,
    Debate,
    Socratic,
    Judge,
    NaturalChat,
}

impl From<ModeArg> for Mode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Answer => Self::Answer,
            ModeArg::Debate => Self::Debate,
            ModeArg::Socratic => Self::Socratic,
            ModeArg::Judge => Self::Judge,
            ModeArg::NaturalChat => Self::NaturalChat,
        }
    }
}

/// The fixed set of collaborators the bundled `mhsb` binary runs against:
/// the bundled catalog behind [`FixtureRetrieval`] and the deterministic
/// [`FixtureModelClient`] standing in for the out-of-scope foundation
/// model, both deliberately out of scope here.
pub struct Engine {
    pub catalog: Arc<Catalog>,
    pub retrieval: FixtureRetrieval,
    pub model: FixtureModelClient,
    pub config: Config,
}

impl Engine {
    #[must_use]
    pub fn bundled() -> Self {
        let catalog = Arc::new(bundled_catalog());
        Self {
            retrieval: FixtureRetrieval::new(Arc::clone(&catalog)),
            catalog,
            model: FixtureModelClient::new(),
            config: Config::from_env(),
        }
    }

    /// Drive one question through [`run_pipeline`] against this engine's
    /// collaborators, recording the run in an in-memory trace sink.
    ///
    /// # Errors
    /// Returns an error only for conditions the orchestrator does not map
    /// to a safe refusal (it maps almost everything to one).
    pub async fn ask(&self, request_id: &str, question: &str, mode: Mode) -> Result<(FinalResponse, InMemoryTraceSink), Error> {
        let trace_sink = InMemoryTraceSink::new();
        let response = run_pipeline(
            request_id,
            question,
            mode,
            &self.catalog,
            &self.retrieval,
            &self.model,
            &trace_sink,
            &self.config,
        )
        .await?;
        Ok((response, trace_sink))
    }
}

/// Render a [`FinalResponse`] the way an Arabic-first terminal consumer
/// would want to read it: answer first, citations and contract outcome
/// after.
#[must_use]
pub fn render_text(response: &FinalResponse) -> String {
    let mut out = String::new();
    if response.not_found {
        out.push_str("⛔ ");
        out.push_str(response.abstain_reason.as_deref().unwrap_or("لا تتوفر أدلة كافية للإجابة."));
    } else {
        out.push_str(&response.answer_ar);
    }
    out.push_str("\n\n");
    out.push_str(&format!("الثقة: {:?} | الحكم: {:?}\n", response.confidence, response.contract_outcome));
    if !response.citations.is_empty() {
        out.push_str("الاستشهادات:\n");
        for c in &response.citations {
            out.push_str(&format!("  - {} [{:?}/{:?}]\n", c.chunk_id, c.status, c.method));
        }
    }
    if !response.contract_reasons.is_empty() {
        out.push_str(&format!("الأسباب: {}\n", response.contract_reasons.join(", ")));
    }
    out
}

/// The six literal scenario questions the engine is exercised against, each paired with the
/// name of the invariant it is meant to exercise.
#[must_use]
pub fn demo_scenarios() -> Vec<(&'static str, &'static str)> {
    vec![
        ("ما هي ركائز الحياة الطيبة الخمس؟", "list_pillars structural answer, 5 citations"),
        (
            "عرّف التزكية كما ورد في الإطار، واذكر نصًا مُستشهدًا من المصدر.",
            "definition_with_evidence, >=2 citations",
        ),
        ("ما حكم صيام يوم الجمعة؟", "fiqh refusal with reframing"),
        ("من هو مؤلف الإطار؟", "out-of-scope refusal without reframing"),
        (
            "قارن بين التزكية والمراقبة من حيث الأثر على الحياة الروحية.",
            "connect_across_pillars, argument chain",
        ),
        ("اكتب قصيدة عن الصبر.", "ambiguous intent, insufficient-evidence refusal"),
    ]
}

/// Parse `argv`-derived CLI args and run the requested command against
/// the bundled engine. Shared by the `mhsb` binary and the root
/// `muhasibi` binary, which only differ in their process name.
///
/// # Errors
/// Propagates a pipeline error or an I/O/serialization failure while
/// printing the response; see [`Engine::ask`].
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let engine = Engine::bundled();

    match cli.command {
        Command::Ask { question, mode, json, trace } => {
            let (response, trace_sink) = pollster::block_on(engine.ask("cli-request", &question, mode.into()))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                println!("{}", render_text(&response));
            }
            if trace {
                for run in trace_sink.runs() {
                    println!("{:#?}", run.state_trace);
                }
            }
        }
        Command::Demo => {
            for (question, expectation) in demo_scenarios() {
                let (response, _trace) = pollster::block_on(engine.ask("demo-request", question, Mode::Answer))?;
                println!("س: {question}");
                println!("  يتحقق من: {expectation}");
                println!(
                    "  not_found={} confidence={:?} contract={:?} citations={}",
                    response.not_found,
                    response.confidence,
                    response.contract_outcome,
                    response.citations.len()
                );
                println!();
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_ask_list_pillars_is_fully_cited() {
        let engine = Engine::bundled();
        let (response, _trace) =
            pollster::block_on(engine.ask("r1", "ما هي ركائز الحياة الطيبة الخمس؟", Mode::Answer)).unwrap();
        assert!(!response.not_found);
        assert_eq!(response.citations.len(), 5);
    }

    #[test]
    fn engine_ask_fiqh_question_refuses() {
        let engine = Engine::bundled();
        let (response, _trace) = pollster::block_on(engine.ask("r2", "ما حكم صيام يوم الجمعة؟", Mode::Answer)).unwrap();
        assert!(response.not_found);
        assert!(response.citations.is_empty());
    }

    #[test]
    fn render_text_includes_contract_outcome() {
        let engine = Engine::bundled();
        let (response, _trace) = pollster::block_on(engine.ask("r3", "ما حكم صيام يوم الجمعة؟", Mode::Answer)).unwrap();
        let text = render_text(&response);
        assert!(text.contains("الحكم"));
    }

    #[test]
    fn demo_scenarios_has_six_entries() {
        assert_eq!(demo_scenarios().len(), 6);
    }
}
