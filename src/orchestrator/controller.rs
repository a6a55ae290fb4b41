//! Submission lifecycle controller.
//!
//! Owns the trigger/error/view state, drives one request-response cycle at a time and
//! emits events for presentation layers.

use super::form::SubmissionForm;
use crate::error::SubmitError;
use crate::model::{
    ActiveView, AnalysisResult, ClientConfig, SubmitEvent, SubmitState, TriggerLabel, ViewState,
};
use crate::render::{self, DashboardSink, EventSink, RenderPlan};
use crate::transport::{AnalysisTransport, HttpTransport};
use anyhow::Result;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

/// Commands emitted by UI layers.
#[derive(Debug, Clone)]
pub(crate) enum UiCommand {
    Submit(SubmissionForm),
    /// Leave the results view and start a fresh cycle.
    NewCycle,
    Quit,
}

pub struct SubmissionController<T> {
    transport: T,
    check_weight_sum: bool,
    state: SubmitState,
    view: ViewState,
    events: UnboundedSender<SubmitEvent>,
}

impl<T: AnalysisTransport + Sync> SubmissionController<T> {
    pub fn new(transport: T, check_weight_sum: bool, events: UnboundedSender<SubmitEvent>) -> Self {
        Self {
            transport,
            check_weight_sum,
            state: SubmitState::Idle,
            view: ViewState::default(),
            events,
        }
    }

    pub fn state(&self) -> SubmitState {
        self.state
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// Re-emit the current state, e.g. for a freshly attached UI.
    pub fn publish(&self) {
        let _ = self.events.send(SubmitEvent::StateChanged {
            state: self.state,
            view: self.view.clone(),
        });
    }

    /// Run one full submission cycle.
    ///
    /// The form is read now. On success the render plan has been applied to `sink` and the
    /// decoded result is returned; on failure the error is already displayed in the view
    /// state and the trigger is usable again.
    pub async fn submit<S>(&mut self, form: &SubmissionForm, sink: &mut S) -> Result<AnalysisResult, SubmitError>
    where
        S: DashboardSink + Send + ?Sized,
    {
        if !self.state.can_submit() {
            warn!("submit ignored: request already in flight");
            return Err(SubmitError::Busy);
        }
        self.enter_submitting();

        match self.run_cycle(form).await {
            Ok((result, plan)) => {
                self.enter_success(&plan, sink);
                let _ = self.events.send(SubmitEvent::Completed {
                    result: Box::new(result.clone()),
                    completed_at: now_rfc3339(),
                });
                Ok(result)
            }
            Err(err) => {
                self.enter_failed(&err);
                Err(err)
            }
        }
    }

    async fn run_cycle(&self, form: &SubmissionForm) -> Result<(AnalysisResult, RenderPlan), SubmitError> {
        let request = form.build_request(self.check_weight_sum).await?;
        let result = self.transport.analyze(request).await?;
        let plan = render::render(&result)?;
        Ok((result, plan))
    }

    fn enter_submitting(&mut self) {
        self.state = SubmitState::Submitting;
        self.view.trigger_enabled = false;
        self.view.trigger_label = TriggerLabel::Busy;
        self.view.error = None;
        info!("submission started");
        self.publish();
    }

    fn enter_success<S: DashboardSink + ?Sized>(&mut self, plan: &RenderPlan, sink: &mut S) {
        plan.apply_to(sink);
        self.state = SubmitState::Success;
        // The results view replaces the form, so the trigger stays as it was.
        self.view.active_view = ActiveView::Results;
        info!(rows = plan.rows.len(), top = %plan.top.profile, "submission succeeded");
        self.publish();
    }

    fn enter_failed(&mut self, err: &SubmitError) {
        self.state = SubmitState::Failed;
        self.view.error = Some(err.to_string());
        self.view.trigger_enabled = true;
        self.view.trigger_label = TriggerLabel::Ready;
        warn!(kind = ?err.kind(), error = %err, "submission failed");
        self.publish();
    }

    /// Return to the submission view for a new cycle after a success.
    pub fn reset_view(&mut self) {
        self.view = ViewState::default();
        self.publish();
    }
}

fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "now".into())
}

type Flight<T> = tokio::task::JoinHandle<(SubmissionController<T>, Result<AnalysisResult, SubmitError>)>;

/// Build the HTTP transport from `cfg` and serve UI commands until quit.
pub(crate) async fn run_http_controller(
    cfg: &ClientConfig,
    event_tx: UnboundedSender<SubmitEvent>,
    cmd_rx: UnboundedReceiver<UiCommand>,
) -> Result<()> {
    let transport = HttpTransport::new(cfg)?;
    info!(endpoint = %transport.endpoint(), "controller ready");
    run_controller(transport, cfg.check_weight_sum, event_tx, cmd_rx).await
}

/// Serve UI commands until quit, running at most one submission at a time.
///
/// The controller is moved into the in-flight task and handed back on completion, so a
/// submit that arrives meanwhile finds no controller and is rejected rather than queued.
/// A new-cycle request received in that window is held until the controller returns.
pub(crate) async fn run_controller<T>(
    transport: T,
    check_weight_sum: bool,
    event_tx: UnboundedSender<SubmitEvent>,
    mut cmd_rx: UnboundedReceiver<UiCommand>,
) -> Result<()>
where
    T: AnalysisTransport + Clone + Send + Sync + 'static,
{
    let fresh = |transport: T| SubmissionController::new(transport, check_weight_sum, event_tx.clone());
    let mut idle = Some(fresh(transport.clone()));
    let mut in_flight: Option<Flight<T>> = None;
    let mut reset_pending = false;
    if let Some(ctrl) = &idle {
        ctrl.publish();
    }

    let res = loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UiCommand::Submit(form)) => match idle.take() {
                        Some(mut ctrl) => {
                            reset_pending = false;
                            let mut sink = EventSink::new(event_tx.clone());
                            in_flight = Some(tokio::spawn(async move {
                                let outcome = ctrl.submit(&form, &mut sink).await;
                                (ctrl, outcome)
                            }));
                        }
                        None => {
                            let _ = event_tx.send(SubmitEvent::Info(SubmitError::Busy.to_string()));
                        }
                    },
                    Some(UiCommand::NewCycle) => match idle.as_mut() {
                        Some(ctrl) => ctrl.reset_view(),
                        None => reset_pending = true,
                    },
                    Some(UiCommand::Quit) | None => break Ok(()),
                }
            }
            // Do not take the JoinHandle before this branch wins; otherwise it is dropped
            // when the command branch is chosen and completion is never observed.
            maybe_done = async {
                if let Some(h) = in_flight.as_mut() {
                    return Some(h.await);
                }
                futures::future::pending().await
            } => {
                if let Some(join_res) = maybe_done {
                    in_flight = None;
                    match join_res {
                        Ok((mut ctrl, outcome)) => {
                            if let Err(e) = outcome {
                                debug!(error = %e, "submission cycle ended in failure");
                            }
                            if std::mem::take(&mut reset_pending) && ctrl.state() == SubmitState::Success {
                                ctrl.reset_view();
                            }
                            idle = Some(ctrl);
                        }
                        Err(e) => {
                            let _ = event_tx.send(SubmitEvent::Info(format!(
                                "Submission task failed: {e}"
                            )));
                            reset_pending = false;
                            let ctrl = fresh(transport.clone());
                            ctrl.publish();
                            idle = Some(ctrl);
                        }
                    }
                }
            }
        }
    };

    res
}

#[cfg(test)]
pub(crate) mod fake {
    use crate::error::SubmitError;
    use crate::model::{AnalysisResult, SubmissionRequest};
    use crate::transport::AnalysisTransport;
    use std::sync::{Arc, Mutex};
    use tokio::sync::Notify;

    /// Transport returning scripted outcomes and recording what it was sent.
    pub struct FakeTransport {
        outcomes: Mutex<Vec<Result<AnalysisResult, SubmitError>>>,
        pub sent: Mutex<Vec<SubmissionRequest>>,
    }

    impl FakeTransport {
        pub fn new(mut outcomes: Vec<Result<AnalysisResult, SubmitError>>) -> Self {
            outcomes.reverse();
            Self {
                outcomes: Mutex::new(outcomes),
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    impl AnalysisTransport for FakeTransport {
        async fn analyze(&self, request: SubmissionRequest) -> Result<AnalysisResult, SubmitError> {
            self.sent.lock().unwrap().push(request);
            self.outcomes
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(SubmitError::Transport("no scripted outcome".into())))
        }
    }

    /// Transport that holds every request until released, then answers with `result`.
    #[derive(Clone)]
    pub struct GatedTransport {
        pub sent: Arc<Mutex<Vec<SubmissionRequest>>>,
        gate: Arc<Notify>,
        result: AnalysisResult,
    }

    impl GatedTransport {
        pub fn new(result: AnalysisResult) -> Self {
            Self {
                sent: Arc::new(Mutex::new(Vec::new())),
                gate: Arc::new(Notify::new()),
                result,
            }
        }

        pub fn release(&self) {
            self.gate.notify_one();
        }
    }

    impl AnalysisTransport for GatedTransport {
        async fn analyze(&self, request: SubmissionRequest) -> Result<AnalysisResult, SubmitError> {
            self.sent.lock().unwrap().push(request);
            self.gate.notified().await;
            Ok(self.result.clone())
        }
    }
}
