//! The session state machine.
//!
//! ```text
//! Empty --UploadRequested--> Uploading --UploadSucceeded--> Ready
//! Ready --AnalysisRequested--> Analyzing --AnalysisSucceeded--> Analyzed
//! Analyzed --BackFromAnalysis--> Ready
//! Ready | Analyzed --ReuploadRequested, ReuploadConfirmed--> Empty
//! Uploading | Analyzing --*Failed--> Error { resume } --ErrorAcknowledged | ErrorExpired--> resume
//! ```
//!
//! Questions run beside the main phases while a document is held. At most one
//! collaborator call (upload, analysis, or question) is in flight at a time.

use std::fmt;

use clauselens_core::{AnalysisRequest, NormalizedInsight, UploadFile, UploadedDocument};

use crate::drag::DragCounter;
use crate::error::WorkflowError;
use crate::progress::SimulatedProgress;

/// A phase the session can rest in between collaborator calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StablePhase {
    Empty,
    Ready,
}

impl From<StablePhase> for Phase {
    fn from(p: StablePhase) -> Self {
        match p {
            StablePhase::Empty => Phase::Empty,
            StablePhase::Ready => Phase::Ready,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Empty,
    Uploading,
    Ready,
    Analyzing,
    Analyzed,
    /// An upload or analysis failed; the banner is showing until it is
    /// acknowledged or expires, then the session returns to `resume`.
    Error { resume: StablePhase },
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Empty => "empty",
            Self::Uploading => "uploading",
            Self::Ready => "ready",
            Self::Analyzing => "analyzing",
            Self::Analyzed => "analyzed",
            Self::Error { .. } => "showing an error",
        };
        f.write_str(s)
    }
}

/// Collaborator call kinds subject to the single-in-flight rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Upload,
    Analysis,
    Question,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Upload => "upload",
            Self::Analysis => "analysis",
            Self::Question => "question",
        })
    }
}

/// The upload/analysis error banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorNotice {
    /// Distinguishes this error from later ones so a stale timer cannot clear them.
    pub seq: u64,
    pub message: String,
}

/// Q&A panel state. Its error channel is separate from the main banner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionState {
    pub question: Option<String>,
    pub progress: SimulatedProgress,
    pub answer: Option<String>,
    pub error: Option<String>,
}

/// Inputs to the reducer: user intents and collaborator outcomes.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    UploadRequested(UploadFile),
    UploadSucceeded(UploadedDocument),
    UploadFailed(String),
    /// A combined upload-and-analyze call returned both parts.
    UploadAnalyzed {
        document: UploadedDocument,
        insight: Box<NormalizedInsight>,
    },
    AnalysisRequested,
    AnalysisSucceeded(Box<NormalizedInsight>),
    AnalysisFailed(String),
    BackFromAnalysis,
    ReuploadRequested,
    ReuploadConfirmed,
    ReuploadCancelled,
    QuestionAsked(String),
    QuestionProgressTick,
    QuestionAnswered(String),
    QuestionFailed(String),
    ErrorAcknowledged,
    ErrorExpired { seq: u64 },
    DragEntered,
    DragLeft,
    DragEnded,
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Self::UploadRequested(_) => "upload-requested",
            Self::UploadSucceeded(_) => "upload-succeeded",
            Self::UploadFailed(_) => "upload-failed",
            Self::UploadAnalyzed { .. } => "upload-analyzed",
            Self::AnalysisRequested => "analysis-requested",
            Self::AnalysisSucceeded(_) => "analysis-succeeded",
            Self::AnalysisFailed(_) => "analysis-failed",
            Self::BackFromAnalysis => "back-from-analysis",
            Self::ReuploadRequested => "reupload-requested",
            Self::ReuploadConfirmed => "reupload-confirmed",
            Self::ReuploadCancelled => "reupload-cancelled",
            Self::QuestionAsked(_) => "question-asked",
            Self::QuestionProgressTick => "question-progress-tick",
            Self::QuestionAnswered(_) => "question-answered",
            Self::QuestionFailed(_) => "question-failed",
            Self::ErrorAcknowledged => "error-acknowledged",
            Self::ErrorExpired { .. } => "error-expired",
            Self::DragEntered => "drag-entered",
            Self::DragLeft => "drag-left",
            Self::DragEnded => "drag-ended",
        }
    }
}

/// Work the driver must perform after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    Upload(UploadFile),
    Analyze(AnalysisRequest),
    Ask {
        document_text: String,
        question: String,
    },
    ScheduleErrorClear {
        seq: u64,
    },
}

/// Everything the view may render for the current document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    phase: Phase,
    document: Option<UploadedDocument>,
    insight: Option<NormalizedInsight>,
    error: Option<ErrorNotice>,
    in_flight: Option<Operation>,
    confirming_reupload: bool,
    question: QuestionState,
    drag: DragCounter,
    upload_resume: Option<StablePhase>,
    next_error_seq: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn document(&self) -> Option<&UploadedDocument> {
        self.document.as_ref()
    }

    /// The stored insight, whether or not it is currently on screen.
    pub fn insight(&self) -> Option<&NormalizedInsight> {
        self.insight.as_ref()
    }

    /// The insight the view should render: only while `Analyzed`.
    pub fn visible_insight(&self) -> Option<&NormalizedInsight> {
        match self.phase {
            Phase::Analyzed => self.insight.as_ref(),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorNotice> {
        self.error.as_ref()
    }

    pub fn in_flight(&self) -> Option<Operation> {
        self.in_flight
    }

    pub fn is_confirming_reupload(&self) -> bool {
        self.confirming_reupload
    }

    pub fn question(&self) -> &QuestionState {
        &self.question
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_active()
    }

    // ── Which controls are enabled ──

    pub fn can_upload(&self) -> bool {
        self.in_flight.is_none() && matches!(self.phase, Phase::Empty | Phase::Ready)
    }

    pub fn can_analyze(&self) -> bool {
        self.in_flight.is_none()
            && self.phase == Phase::Ready
            && self.document.as_ref().is_some_and(UploadedDocument::has_text)
    }

    pub fn can_ask(&self) -> bool {
        self.in_flight.is_none()
            && self.document.is_some()
            && matches!(self.phase, Phase::Ready | Phase::Analyzed)
    }

    /// Apply one event. Rejected events leave the session unchanged.
    pub fn apply(&mut self, event: Event) -> Result<Effect, WorkflowError> {
        match event {
            Event::UploadRequested(file) => self.request_upload(file),
            Event::UploadSucceeded(document) => {
                self.expect_in_flight(Operation::Upload, "complete an upload")?;
                self.document = Some(document);
                self.insight = None;
                self.question = QuestionState::default();
                self.finish(Phase::Ready);
                Ok(Effect::None)
            }
            Event::UploadFailed(message) => {
                self.expect_in_flight(Operation::Upload, "fail an upload")?;
                let resume = self.upload_resume.unwrap_or(StablePhase::Empty);
                Ok(self.raise(resume, message))
            }
            Event::UploadAnalyzed { document, insight } => {
                self.expect_in_flight(Operation::Upload, "complete an upload")?;
                self.document = Some(document);
                self.insight = Some(*insight);
                self.question = QuestionState::default();
                self.finish(Phase::Analyzed);
                Ok(Effect::None)
            }
            Event::AnalysisRequested => self.request_analysis(),
            Event::AnalysisSucceeded(insight) => {
                self.expect_in_flight(Operation::Analysis, "complete an analysis")?;
                self.insight = Some(*insight);
                self.finish(Phase::Analyzed);
                Ok(Effect::None)
            }
            Event::AnalysisFailed(message) => {
                self.expect_in_flight(Operation::Analysis, "fail an analysis")?;
                Ok(self.raise(StablePhase::Ready, message))
            }
            Event::BackFromAnalysis => {
                self.require(
                    matches!(self.phase, Phase::Analyzed),
                    "go back from analysis",
                )?;
                self.phase = Phase::Ready;
                Ok(Effect::None)
            }
            Event::ReuploadRequested => {
                self.ensure_idle()?;
                self.require(
                    matches!(self.phase, Phase::Ready | Phase::Analyzed),
                    "reupload",
                )?;
                self.confirming_reupload = true;
                Ok(Effect::None)
            }
            Event::ReuploadConfirmed => {
                self.ensure_idle()?;
                self.require(self.confirming_reupload, "confirm a reupload")?;
                self.document = None;
                self.insight = None;
                self.question = QuestionState::default();
                self.confirming_reupload = false;
                self.phase = Phase::Empty;
                Ok(Effect::None)
            }
            Event::ReuploadCancelled => {
                self.confirming_reupload = false;
                Ok(Effect::None)
            }
            Event::QuestionAsked(question) => self.request_question(question),
            Event::QuestionProgressTick => {
                if self.in_flight == Some(Operation::Question) {
                    self.question.progress.tick();
                }
                Ok(Effect::None)
            }
            Event::QuestionAnswered(answer) => {
                self.expect_in_flight(Operation::Question, "record an answer")?;
                self.question.progress.complete();
                self.question.answer = Some(answer);
                self.in_flight = None;
                Ok(Effect::None)
            }
            Event::QuestionFailed(message) => {
                self.expect_in_flight(Operation::Question, "record a question failure")?;
                self.question.progress.reset();
                self.question.error = Some(message);
                self.in_flight = None;
                Ok(Effect::None)
            }
            Event::ErrorAcknowledged => {
                self.clear_error();
                Ok(Effect::None)
            }
            Event::ErrorExpired { seq } => {
                if self.error.as_ref().is_some_and(|e| e.seq == seq) {
                    self.clear_error();
                }
                Ok(Effect::None)
            }
            Event::DragEntered => {
                self.drag.enter();
                Ok(Effect::None)
            }
            Event::DragLeft => {
                self.drag.leave();
                Ok(Effect::None)
            }
            Event::DragEnded => {
                self.drag.reset();
                Ok(Effect::None)
            }
        }
    }

    fn request_upload(&mut self, file: UploadFile) -> Result<Effect, WorkflowError> {
        self.ensure_idle()?;
        let resume = match self.phase {
            Phase::Empty => StablePhase::Empty,
            Phase::Ready => StablePhase::Ready,
            _ => return Err(self.invalid("upload")),
        };
        if file.name.trim().is_empty() {
            return Err(WorkflowError::Validation("no file selected".into()));
        }
        self.upload_resume = Some(resume);
        self.confirming_reupload = false;
        self.drag.reset();
        self.in_flight = Some(Operation::Upload);
        self.phase = Phase::Uploading;
        Ok(Effect::Upload(file))
    }

    fn request_analysis(&mut self) -> Result<Effect, WorkflowError> {
        self.ensure_idle()?;
        let Some(request) = self
            .document
            .as_ref()
            .and_then(|doc| AnalysisRequest::comprehensive(&doc.extracted_text))
        else {
            return Err(WorkflowError::Validation(
                "no document text to analyze".into(),
            ));
        };
        self.require(self.phase == Phase::Ready, "start analysis")?;
        self.confirming_reupload = false;
        self.in_flight = Some(Operation::Analysis);
        self.phase = Phase::Analyzing;
        Ok(Effect::Analyze(request))
    }

    fn request_question(&mut self, question: String) -> Result<Effect, WorkflowError> {
        self.ensure_idle()?;
        let question = question.trim().to_string();
        if question.is_empty() {
            return Err(WorkflowError::Validation("question is empty".into()));
        }
        let Some(document) = self.document.as_ref() else {
            return Err(WorkflowError::Validation("no document to ask about".into()));
        };
        self.require(
            matches!(self.phase, Phase::Ready | Phase::Analyzed),
            "ask a question",
        )?;
        let document_text = document.extracted_text.clone();
        self.question = QuestionState {
            question: Some(question.clone()),
            ..QuestionState::default()
        };
        self.in_flight = Some(Operation::Question);
        Ok(Effect::Ask {
            document_text,
            question,
        })
    }

    fn ensure_idle(&self) -> Result<(), WorkflowError> {
        match self.in_flight {
            Some(op) => Err(WorkflowError::ConcurrentOperation(op)),
            None => Ok(()),
        }
    }

    fn expect_in_flight(&self, op: Operation, action: &'static str) -> Result<(), WorkflowError> {
        self.require(self.in_flight == Some(op), action)
    }

    fn require(&self, ok: bool, operation: &'static str) -> Result<(), WorkflowError> {
        if ok {
            Ok(())
        } else {
            Err(self.invalid(operation))
        }
    }

    fn invalid(&self, operation: &'static str) -> WorkflowError {
        WorkflowError::InvalidState {
            operation,
            phase: self.phase,
        }
    }

    fn finish(&mut self, phase: Phase) {
        self.in_flight = None;
        self.upload_resume = None;
        self.error = None;
        self.phase = phase;
    }

    fn raise(&mut self, resume: StablePhase, message: String) -> Effect {
        self.next_error_seq += 1;
        let seq = self.next_error_seq;
        self.in_flight = None;
        self.upload_resume = None;
        self.error = Some(ErrorNotice { seq, message });
        self.phase = Phase::Error { resume };
        Effect::ScheduleErrorClear { seq }
    }

    fn clear_error(&mut self) {
        self.error = None;
        if let Phase::Error { resume } = self.phase {
            self.phase = resume.into();
        }
    }
}
