//! Async driver for [`Session`].
//!
//! The controller is the only writer of the session. Every operation applies
//! its request event, performs the resulting collaborator call with the lock
//! released, then applies the outcome event. The call and its outcome run on a
//! spawned task, so a caller that stops waiting (a timeout, a lost `select!`)
//! never leaves an operation in flight. Collaborator calls are never retried or
//! cancelled.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use clauselens_core::{DocumentService, UploadFile, UploadedDocument, normalize};
use tracing::{debug, info, warn};

use crate::error::WorkflowError;
use crate::progress::PROGRESS_INTERVAL;
use crate::state::{Effect, Event, Operation, Session};

/// How long an upload/analysis error stays on screen.
pub const ERROR_CLEAR_AFTER: Duration = Duration::from_secs(5);

/// Drives one document session against a [`DocumentService`].
///
/// Cloning yields another handle to the same session.
pub struct WorkflowController<S> {
    service: Arc<S>,
    session: Arc<Mutex<Session>>,
    error_clear_after: Duration,
    progress_interval: Duration,
}

impl<S> Clone for WorkflowController<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            session: Arc::clone(&self.session),
            error_clear_after: self.error_clear_after,
            progress_interval: self.progress_interval,
        }
    }
}

impl<S: DocumentService + 'static> WorkflowController<S> {
    pub fn new(service: S) -> Self {
        Self {
            service: Arc::new(service),
            session: Arc::new(Mutex::new(Session::new())),
            error_clear_after: ERROR_CLEAR_AFTER,
            progress_interval: PROGRESS_INTERVAL,
        }
    }

    /// A copy of the current session for rendering.
    pub fn snapshot(&self) -> Session {
        self.lock().clone()
    }

    /// Send `file` for extraction. Valid from `Empty` or `Ready`.
    ///
    /// A drop ends the drag hover whether or not the upload is accepted.
    pub async fn submit_upload(&self, file: UploadFile) -> Result<(), WorkflowError> {
        let _ = self.dispatch(Event::DragEnded);
        let Effect::Upload(file) = self.dispatch(Event::UploadRequested(file))? else {
            return Ok(());
        };
        let this = self.clone();
        self.run_to_completion(Operation::Upload, async move { this.finish_upload(file).await })
            .await
    }

    /// Upload `file` and analyse it in one collaborator exchange, landing in
    /// `Analyzed`. Valid from `Empty` or `Ready`; failures are reported as
    /// upload errors.
    pub async fn submit_upload_and_analyze(&self, file: UploadFile) -> Result<(), WorkflowError> {
        let _ = self.dispatch(Event::DragEnded);
        let Effect::Upload(file) = self.dispatch(Event::UploadRequested(file))? else {
            return Ok(());
        };
        let this = self.clone();
        self.run_to_completion(Operation::Upload, async move {
            this.finish_upload_and_analyze(file).await
        })
        .await
    }

    /// Ask for the discard confirmation. Valid from `Ready` or `Analyzed`.
    pub fn request_reupload(&self) -> Result<(), WorkflowError> {
        self.dispatch(Event::ReuploadRequested).map(drop)
    }

    /// Discard the document and any insight, returning to `Empty`.
    pub fn confirm_reupload(&self) -> Result<(), WorkflowError> {
        self.dispatch(Event::ReuploadConfirmed).map(drop)
    }

    pub fn cancel_reupload(&self) {
        let _ = self.dispatch(Event::ReuploadCancelled);
    }

    /// Run a comprehensive analysis of the current document. Valid from `Ready`.
    pub async fn start_analysis(&self) -> Result<(), WorkflowError> {
        let Effect::Analyze(request) = self.dispatch(Event::AnalysisRequested)? else {
            return Ok(());
        };

        info!(
            chars = request.document_text.len(),
            analysis_type = request.analysis_type.as_str(),
            "starting analysis"
        );
        let this = self.clone();
        self.run_to_completion(Operation::Analysis, async move {
            match this.service.analyze(&request).await {
                Ok(raw) => {
                    let insight = normalize(&raw);
                    info!(
                        risk_level = %insight.risk_level,
                        risk_score = insight.risk_score,
                        clauses = insight.key_clauses.len(),
                        "analysis complete"
                    );
                    this.dispatch(Event::AnalysisSucceeded(Box::new(insight)))?;
                    Ok(())
                }
                Err(e) => this.record_failure(Operation::Analysis, e.to_string()),
            }
        })
        .await
    }

    /// Return from the analysis view to `Ready`, keeping the insight.
    pub fn go_back_from_analysis(&self) -> Result<(), WorkflowError> {
        self.dispatch(Event::BackFromAnalysis).map(drop)
    }

    /// Ask a question about the current document.
    ///
    /// While the call is pending, the session's question progress advances on
    /// a timer. That indicator is cosmetic: the call reports nothing until it
    /// returns. The answer (or error) is left in the session's question state.
    pub async fn ask_question(&self, question: &str) -> Result<(), WorkflowError> {
        let Effect::Ask {
            document_text,
            question,
        } = self.dispatch(Event::QuestionAsked(question.to_string()))?
        else {
            return Ok(());
        };

        info!(question = %question, "asking question");
        let this = self.clone();
        self.run_to_completion(Operation::Question, async move {
            this.finish_question(document_text, question).await
        })
        .await
    }

    /// Dismiss the error banner before it times out.
    pub fn acknowledge_error(&self) {
        let _ = self.dispatch(Event::ErrorAcknowledged);
    }

    pub fn drag_enter(&self) {
        let _ = self.dispatch(Event::DragEntered);
    }

    pub fn drag_leave(&self) {
        let _ = self.dispatch(Event::DragLeft);
    }

    /// Drop, cancel, or drag end.
    pub fn drag_end(&self) {
        let _ = self.dispatch(Event::DragEnded);
    }

    // ── Collaborator calls ──

    async fn finish_upload(&self, file: UploadFile) -> Result<(), WorkflowError> {
        info!(name = %file.name, size = file.size_bytes(), "uploading document");
        match self.service.upload(&file).await {
            Ok(extraction) => {
                let document =
                    UploadedDocument::from_extraction(&file, extraction.text, extraction.metadata);
                info!(
                    name = %document.name,
                    chars = document.extracted_text.len(),
                    "document extracted"
                );
                self.dispatch(Event::UploadSucceeded(document))?;
                Ok(())
            }
            Err(e) => self.record_failure(Operation::Upload, e.to_string()),
        }
    }

    async fn finish_upload_and_analyze(&self, file: UploadFile) -> Result<(), WorkflowError> {
        info!(name = %file.name, size = file.size_bytes(), "uploading document for analysis");
        match self.service.upload_and_analyze(&file).await {
            Ok((extraction, raw)) => {
                let document =
                    UploadedDocument::from_extraction(&file, extraction.text, extraction.metadata);
                let insight = normalize(&raw);
                info!(
                    name = %document.name,
                    risk_level = %insight.risk_level,
                    risk_score = insight.risk_score,
                    "document extracted and analysed"
                );
                self.dispatch(Event::UploadAnalyzed {
                    document,
                    insight: Box::new(insight),
                })?;
                Ok(())
            }
            Err(e) => self.record_failure(Operation::Upload, e.to_string()),
        }
    }

    async fn finish_question(
        &self,
        document_text: String,
        question: String,
    ) -> Result<(), WorkflowError> {
        let mut call = self.service.ask(&document_text, &question);
        let mut ticker = tokio::time::interval(self.progress_interval);
        ticker.tick().await;

        let outcome = loop {
            tokio::select! {
                result = &mut call => break result,
                _ = ticker.tick() => {
                    let _ = self.dispatch(Event::QuestionProgressTick);
                }
            }
        };

        match outcome {
            Ok(answer) => {
                info!(chars = answer.len(), "question answered");
                self.dispatch(Event::QuestionAnswered(answer))?;
                Ok(())
            }
            Err(e) => self.record_failure(Operation::Question, e.to_string()),
        }
    }

    /// Await `call` on its own task. Dropping the returned future detaches the
    /// task instead of cancelling it, so the outcome is always recorded.
    async fn run_to_completion<F>(&self, op: Operation, call: F) -> Result<(), WorkflowError>
    where
        F: Future<Output = Result<(), WorkflowError>> + Send + 'static,
    {
        match tokio::spawn(call).await {
            Ok(result) => result,
            Err(e) => self.record_failure(op, format!("{op} task ended unexpectedly: {e}")),
        }
    }

    /// Record a failed call in the session and report it to the caller.
    fn record_failure(&self, op: Operation, message: String) -> Result<(), WorkflowError> {
        warn!(operation = %op, error = %message, "collaborator call failed");
        match op {
            Operation::Upload => {
                self.fail(Event::UploadFailed(message.clone()))?;
                Err(WorkflowError::Upload(message))
            }
            Operation::Analysis => {
                self.fail(Event::AnalysisFailed(message.clone()))?;
                Err(WorkflowError::Analysis(message))
            }
            Operation::Question => {
                self.dispatch(Event::QuestionFailed(message.clone()))?;
                Err(WorkflowError::Question(message))
            }
        }
    }

    fn fail(&self, event: Event) -> Result<(), WorkflowError> {
        if let Effect::ScheduleErrorClear { seq } = self.dispatch(event)? {
            self.schedule_error_clear(seq);
        }
        Ok(())
    }

    /// Expire error `seq` after the display timeout. Does not touch any call in flight.
    fn schedule_error_clear(&self, seq: u64) {
        let session = Arc::clone(&self.session);
        let after = self.error_clear_after;
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            let mut session = session.lock().unwrap_or_else(PoisonError::into_inner);
            let _ = session.apply(Event::ErrorExpired { seq });
            debug!(seq, phase = %session.phase(), "error banner expired");
        });
    }

    fn dispatch(&self, event: Event) -> Result<Effect, WorkflowError> {
        let name = event.name();
        let mut session = self.lock();
        let from = session.phase();
        match session.apply(event) {
            Ok(effect) => {
                debug!(event = name, %from, to = %session.phase(), "workflow transition");
                Ok(effect)
            }
            Err(e) => {
                debug!(event = name, phase = %from, error = %e, "workflow event rejected");
                Err(e)
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Operation, Phase, StablePhase};
    use async_trait::async_trait;
    use clauselens_core::{AnalysisRequest, CollaboratorError, Extraction, RawAnalysis};
    use serde_json::{Map, json};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    #[derive(Default)]
    struct FakeService {
        upload_error: Option<String>,
        analysis_error: Option<String>,
        question_error: Option<String>,
        text: String,
        /// When set, analysis and ask wait for a permit before returning.
        gate: Option<Arc<Notify>>,
        /// When set, upload waits for a permit before returning.
        upload_gate: Option<Arc<Notify>>,
        analyze_delay: Option<Duration>,
        analyze_calls: AtomicUsize,
    }

    impl FakeService {
        fn with_text(text: &str) -> Self {
            Self {
                text: text.to_string(),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl DocumentService for FakeService {
        async fn upload(&self, _file: &UploadFile) -> Result<Extraction, CollaboratorError> {
            if let Some(gate) = &self.upload_gate {
                gate.notified().await;
            }
            match &self.upload_error {
                Some(msg) => Err(CollaboratorError::rejected(msg.clone())),
                None => Ok(Extraction {
                    text: self.text.clone(),
                    metadata: Map::new(),
                }),
            }
        }

        async fn analyze(
            &self,
            request: &AnalysisRequest,
        ) -> Result<RawAnalysis, CollaboratorError> {
            self.analyze_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.analyze_delay {
                tokio::time::sleep(delay).await;
            }
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            match &self.analysis_error {
                Some(msg) => Err(CollaboratorError::Transport(msg.clone())),
                None => Ok(RawAnalysis::from_value(json!({
                    "document_summary": {"main_purpose": request.document_text},
                    "risk_assessment": {"score": 62, "overall_risk_level": "high"},
                }))),
            }
        }

        async fn ask(&self, _text: &str, question: &str) -> Result<String, CollaboratorError> {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            match &self.question_error {
                Some(msg) => Err(CollaboratorError::rejected(msg.clone())),
                None => Ok(format!("answer to {question}")),
            }
        }
    }

    fn pdf() -> UploadFile {
        UploadFile::new("lease.pdf", b"%PDF-1.7".to_vec())
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn upload_then_analyze() {
        let c = WorkflowController::new(FakeService::with_text("Term: 2 years"));
        c.submit_upload(pdf()).await.unwrap();
        assert_eq!(c.snapshot().phase(), Phase::Ready);

        c.start_analysis().await.unwrap();
        let s = c.snapshot();
        assert_eq!(s.phase(), Phase::Analyzed);
        let insight = s.visible_insight().unwrap();
        assert_eq!(insight.summary, "Term: 2 years");
        assert_eq!(insight.risk_score, 62);
    }

    #[tokio::test]
    async fn reupload_then_analysis_is_validation_error() {
        let c = WorkflowController::new(FakeService::with_text("Term: 2 years"));
        c.submit_upload(pdf()).await.unwrap();
        c.start_analysis().await.unwrap();

        c.request_reupload().unwrap();
        c.confirm_reupload().unwrap();
        let s = c.snapshot();
        assert_eq!(s.phase(), Phase::Empty);
        assert!(s.document().is_none());
        assert!(s.insight().is_none());

        assert!(matches!(
            c.start_analysis().await,
            Err(WorkflowError::Validation(_))
        ));
        assert_eq!(c.snapshot().phase(), Phase::Empty);
    }

    #[tokio::test]
    async fn cancelled_reupload_keeps_state() {
        let c = WorkflowController::new(FakeService::with_text("Term: 2 years"));
        c.submit_upload(pdf()).await.unwrap();
        c.request_reupload().unwrap();
        c.cancel_reupload();
        let s = c.snapshot();
        assert_eq!(s.phase(), Phase::Ready);
        assert!(!s.is_confirming_reupload());
        assert!(s.document().is_some());
    }

    #[tokio::test]
    async fn second_analysis_while_analyzing_is_rejected() {
        let gate = Arc::new(Notify::new());
        let c = WorkflowController::new(FakeService {
            text: "Term: 2 years".into(),
            gate: Some(Arc::clone(&gate)),
            ..FakeService::default()
        });
        // Upload does not wait on the gate.
        c.submit_upload(pdf()).await.unwrap();

        let first = {
            let c = c.clone();
            tokio::spawn(async move { c.start_analysis().await })
        };
        settle().await;
        assert_eq!(c.snapshot().phase(), Phase::Analyzing);

        assert_eq!(
            c.start_analysis().await,
            Err(WorkflowError::ConcurrentOperation(Operation::Analysis))
        );
        assert!(matches!(
            c.ask_question("Who pays?").await,
            Err(WorkflowError::ConcurrentOperation(Operation::Analysis))
        ));
        assert_eq!(c.service.analyze_calls.load(Ordering::SeqCst), 1);

        gate.notify_one();
        first.await.unwrap().unwrap();
        let s = c.snapshot();
        assert_eq!(s.phase(), Phase::Analyzed);
        assert_eq!(s.insight().unwrap().risk_score, 62);
    }

    #[tokio::test(start_paused = true)]
    async fn upload_error_clears_after_timeout() {
        let c = WorkflowController::new(FakeService {
            upload_error: Some("Unsupported file type".into()),
            ..FakeService::default()
        });

        let err = c.submit_upload(pdf()).await.unwrap_err();
        assert_eq!(err, WorkflowError::Upload("Unsupported file type".into()));
        let s = c.snapshot();
        assert_eq!(s.error().unwrap().message, "Unsupported file type");
        assert_eq!(
            s.phase(),
            Phase::Error {
                resume: StablePhase::Empty
            }
        );

        tokio::time::sleep(Duration::from_secs(4)).await;
        assert!(c.snapshot().error().is_some());

        tokio::time::sleep(Duration::from_millis(1_001)).await;
        let s = c.snapshot();
        assert!(s.error().is_none());
        assert_eq!(s.phase(), Phase::Empty);
    }

    #[tokio::test(start_paused = true)]
    async fn analysis_error_returns_to_ready() {
        let c = WorkflowController::new(FakeService {
            text: "Term: 2 years".into(),
            analysis_error: Some("model unavailable".into()),
            ..FakeService::default()
        });
        c.submit_upload(pdf()).await.unwrap();

        let err = c.start_analysis().await.unwrap_err();
        assert_eq!(
            err,
            WorkflowError::Analysis("connection failed: model unavailable".into())
        );
        assert!(c.snapshot().insight().is_none());

        tokio::time::sleep(ERROR_CLEAR_AFTER + Duration::from_millis(1)).await;
        let s = c.snapshot();
        assert_eq!(s.phase(), Phase::Ready);
        assert!(s.document().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn acknowledged_error_is_not_cleared_twice() {
        let c = WorkflowController::new(FakeService {
            text: "Term: 2 years".into(),
            analysis_error: Some("down".into()),
            ..FakeService::default()
        });
        c.submit_upload(pdf()).await.unwrap();
        let _ = c.start_analysis().await;
        c.acknowledge_error();
        assert_eq!(c.snapshot().phase(), Phase::Ready);

        tokio::time::sleep(Duration::from_secs(3)).await;
        let _ = c.start_analysis().await;
        // The first timer fires here but belongs to the acknowledged error.
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(c.snapshot().error().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn question_progress_is_capped_until_answer() {
        let gate = Arc::new(Notify::new());
        let c = WorkflowController::new(FakeService {
            text: "Payment is due in 30 days".into(),
            gate: Some(Arc::clone(&gate)),
            ..FakeService::default()
        });
        c.submit_upload(pdf()).await.unwrap();

        let pending = {
            let c = c.clone();
            tokio::spawn(async move { c.ask_question("When is payment due?").await })
        };
        settle().await;
        assert_eq!(c.snapshot().in_flight(), Some(Operation::Question));

        tokio::time::sleep(PROGRESS_INTERVAL * 3 + Duration::from_millis(1)).await;
        let p = c.snapshot().question().progress.percent();
        assert!(p > 0 && p < 100, "progress {p}");

        tokio::time::sleep(PROGRESS_INTERVAL * 20).await;
        assert_eq!(c.snapshot().question().progress.percent(), 90);

        gate.notify_one();
        pending.await.unwrap().unwrap();
        let q = c.snapshot().question().clone();
        assert_eq!(q.progress.percent(), 100);
        assert_eq!(q.answer.as_deref(), Some("answer to When is payment due?"));
    }

    #[tokio::test]
    async fn question_error_does_not_touch_main_banner() {
        let c = WorkflowController::new(FakeService {
            text: "Term".into(),
            question_error: Some("Q&A service unavailable".into()),
            ..FakeService::default()
        });
        c.submit_upload(pdf()).await.unwrap();
        let err = c.ask_question("Anything?").await.unwrap_err();
        assert_eq!(err, WorkflowError::Question("Q&A service unavailable".into()));
        let s = c.snapshot();
        assert_eq!(s.question().error.as_deref(), Some("Q&A service unavailable"));
        assert!(s.error().is_none());
        assert_eq!(s.phase(), Phase::Ready);
    }

    #[tokio::test]
    async fn empty_question_is_rejected_without_call() {
        let c = WorkflowController::new(FakeService::with_text("Term"));
        c.submit_upload(pdf()).await.unwrap();
        assert!(matches!(
            c.ask_question("  ").await,
            Err(WorkflowError::Validation(_))
        ));
        assert!(c.snapshot().question().question.is_none());
    }

    #[tokio::test]
    async fn drag_hover_tracked_per_controller() {
        let a = WorkflowController::new(FakeService::default());
        let b = WorkflowController::new(FakeService::default());
        a.drag_enter();
        a.drag_enter();
        a.drag_leave();
        assert!(a.snapshot().is_dragging());
        assert!(!b.snapshot().is_dragging());
        a.drag_end();
        assert!(!a.snapshot().is_dragging());
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_analysis_still_completes() {
        let c = WorkflowController::new(FakeService {
            text: "Term: 2 years".into(),
            analyze_delay: Some(Duration::from_secs(60)),
            ..FakeService::default()
        });
        c.submit_upload(pdf()).await.unwrap();

        let waited = tokio::time::timeout(Duration::from_secs(1), c.start_analysis()).await;
        assert!(waited.is_err());
        assert_eq!(c.snapshot().in_flight(), Some(Operation::Analysis));

        tokio::time::sleep(Duration::from_secs(120)).await;
        let s = c.snapshot();
        assert_eq!(s.phase(), Phase::Analyzed);
        assert_eq!(s.in_flight(), None);
        assert_eq!(s.insight().unwrap().risk_score, 62);
        c.request_reupload().unwrap();
        c.confirm_reupload().unwrap();
        assert_eq!(c.snapshot().phase(), Phase::Empty);
    }

    #[tokio::test]
    async fn abandoned_upload_still_completes() {
        let gate = Arc::new(Notify::new());
        let c = WorkflowController::new(FakeService {
            text: "Term: 2 years".into(),
            upload_gate: Some(Arc::clone(&gate)),
            ..FakeService::default()
        });

        tokio::select! {
            _ = c.submit_upload(pdf()) => panic!("upload should still be pending"),
            _ = settle() => {}
        }
        assert_eq!(c.snapshot().phase(), Phase::Uploading);

        gate.notify_one();
        settle().await;
        let s = c.snapshot();
        assert_eq!(s.phase(), Phase::Ready);
        assert_eq!(s.in_flight(), None);
        assert_eq!(s.document().unwrap().extracted_text, "Term: 2 years");
    }

    #[tokio::test]
    async fn drop_while_uploading_ends_hover() {
        let gate = Arc::new(Notify::new());
        let c = WorkflowController::new(FakeService {
            text: "Term".into(),
            upload_gate: Some(Arc::clone(&gate)),
            ..FakeService::default()
        });
        let first = {
            let c = c.clone();
            tokio::spawn(async move { c.submit_upload(pdf()).await })
        };
        settle().await;
        assert_eq!(c.snapshot().in_flight(), Some(Operation::Upload));

        c.drag_enter();
        assert!(c.snapshot().is_dragging());
        assert_eq!(
            c.submit_upload(pdf()).await,
            Err(WorkflowError::ConcurrentOperation(Operation::Upload))
        );
        assert!(!c.snapshot().is_dragging());

        gate.notify_one();
        first.await.unwrap().unwrap();
        assert_eq!(c.snapshot().phase(), Phase::Ready);
    }

    #[tokio::test]
    async fn drop_on_analyzed_view_ends_hover() {
        let c = WorkflowController::new(FakeService::with_text("Term"));
        c.submit_upload(pdf()).await.unwrap();
        c.start_analysis().await.unwrap();

        c.drag_enter();
        assert!(matches!(
            c.submit_upload(pdf()).await,
            Err(WorkflowError::InvalidState { .. })
        ));
        let s = c.snapshot();
        assert!(!s.is_dragging());
        assert_eq!(s.phase(), Phase::Analyzed);
    }

    #[tokio::test]
    async fn combined_upload_lands_in_analyzed() {
        let c = WorkflowController::new(FakeService::with_text("Fee: $500"));
        c.submit_upload_and_analyze(pdf()).await.unwrap();
        let s = c.snapshot();
        assert_eq!(s.phase(), Phase::Analyzed);
        assert_eq!(s.document().unwrap().extracted_text, "Fee: $500");
        let insight = s.visible_insight().unwrap();
        assert_eq!(insight.summary, "Fee: $500");
        assert_eq!(insight.risk_score, 62);
        assert_eq!(c.service.analyze_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn combined_failure_is_an_upload_error() {
        let c = WorkflowController::new(FakeService {
            text: "Fee: $500".into(),
            analysis_error: Some("model unavailable".into()),
            ..FakeService::default()
        });
        let err = c.submit_upload_and_analyze(pdf()).await.unwrap_err();
        assert_eq!(
            err,
            WorkflowError::Upload("connection failed: model unavailable".into())
        );
        let s = c.snapshot();
        assert_eq!(
            s.phase(),
            Phase::Error {
                resume: StablePhase::Empty
            }
        );
        assert!(s.document().is_none());
        assert!(s.insight().is_none());

        tokio::time::sleep(ERROR_CLEAR_AFTER + Duration::from_millis(1)).await;
        assert_eq!(c.snapshot().phase(), Phase::Empty);
    }
}
