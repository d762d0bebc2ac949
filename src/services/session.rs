use std::path::Path;

use serde::Serialize;

use crate::error::{CoreError, Result};
use crate::model::run::{RunEvent, RunState};
use crate::model::term::{EditableColumn, TranslatedTerm};
use crate::services::ai::Translator;
use crate::services::export::{self, ExportSummary};
use crate::services::pipeline::{self, RunOutcome, RunRequest};

/// What the grid front end may do with the working set.
pub trait TermGrid {
    fn render_rows(&self) -> &[TranslatedTerm];

    fn on_cell_edited(&mut self, row: usize, column: EditableColumn, value: String) -> Result<()>;

    fn trigger_export(&self, path: &Path) -> Result<ExportSummary>;
}

/// The single transition table for a translation run.
fn next_state(state: &RunState, event: &RunEvent) -> Result<RunState> {
    use RunEvent::*;
    use RunState::*;

    match (state, event) {
        (Running, Submit) => Err(CoreError::RunInFlight),
        (Idle | Success { .. } | Failed { .. }, Submit) => Ok(Running),
        (Running, Complete(n)) => Ok(Success { count: *n }),
        (Running, Fail(notice)) => Ok(Failed {
            notice: notice.clone(),
        }),
        (from, ev) => Err(CoreError::InvalidTransition {
            from: from.name(),
            event: ev.name(),
        }),
    }
}

#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub prefix: String,
    pub translated: usize,
    pub count: usize,
}

#[derive(Debug, Default)]
pub struct Session {
    state: RunState,
    rows: Vec<TranslatedTerm>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn handle_event(&mut self, event: RunEvent) -> Result<&RunState> {
        let next = next_state(&self.state, &event)?;
        log::debug!("run state {} -> {} on {}", self.state.name(), next.name(), event.name());
        self.state = next;
        Ok(&self.state)
    }

    /// Runs one translation. The working set is replaced only on success;
    /// a rejected submit leaves state and rows as they were.
    #[cfg(test)]
    pub fn submit(&mut self, req: &RunRequest, translator: &dyn Translator) -> Result<RunSummary> {
        self.handle_event(RunEvent::Submit)?;
        self.finish(pipeline::run(req, translator))
    }

    /// Like `submit`, but builds the translator only after the request has
    /// been validated. Connection errors fail the run like any other error.
    pub fn submit_with<F>(&mut self, req: &RunRequest, connect: F) -> Result<RunSummary>
    where
        F: FnOnce() -> Result<Box<dyn Translator>>,
    {
        self.handle_event(RunEvent::Submit)?;
        let result = pipeline::prepare(req).and_then(|prepared| {
            let translator = connect()?;
            pipeline::execute(prepared, translator.as_ref())
        });
        self.finish(result)
    }

    /// Closes a run started with `handle_event(RunEvent::Submit)`.
    pub fn finish(&mut self, result: Result<RunOutcome>) -> Result<RunSummary> {
        match result {
            Ok(outcome) => {
                let count = outcome.rows.len();
                self.handle_event(RunEvent::Complete(count))?;
                self.rows = outcome.rows;
                log::info!("run finished with {count} row(s)");

                Ok(RunSummary {
                    prefix: outcome.prefix,
                    translated: outcome.translated,
                    count,
                })
            }
            Err(e) => {
                log::warn!("run failed: {e}");
                self.handle_event(RunEvent::Fail(e.notice()))?;
                Err(e)
            }
        }
    }

    /// Marks an interrupted run as failed so the next submit is accepted.
    pub fn abort(&mut self, notice: &str) {
        if self.state == RunState::Running {
            let _ = self.handle_event(RunEvent::Fail(notice.to_string()));
        }
    }
}

impl TermGrid for Session {
    fn render_rows(&self) -> &[TranslatedTerm] {
        &self.rows
    }

    fn on_cell_edited(&mut self, row: usize, column: EditableColumn, value: String) -> Result<()> {
        if self.state == RunState::Running {
            return Err(CoreError::RunInFlight);
        }

        let len = self.rows.len();
        let t = self
            .rows
            .get_mut(row)
            .ok_or_else(|| CoreError::InvalidEdit(format!("row {row} out of range ({len} rows)")))?;

        let optional = |v: String| if v.is_empty() { None } else { Some(v) };

        match column {
            EditableColumn::Code => t.code = value,
            EditableColumn::Type => t.kind = value,
            EditableColumn::Group => t.group = value,
            EditableColumn::ZhCn => t.term.zh_cn = value,
            EditableColumn::ZhHk => t.term.zh_hk = optional(value),
            EditableColumn::EnUs => t.term.en_us = optional(value),
        }

        Ok(())
    }

    fn trigger_export(&self, path: &Path) -> Result<ExportSummary> {
        export::write_xlsx(&self.rows, path)
    }
}
