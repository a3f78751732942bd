//! Orchestration Engine
//!
//! Decides which definitions a trigger runs and which of the resulting
//! terminals is shown:
//!
//! - [`Orchestrator::run_all`] - every batch-eligible definition, concurrently
//! - [`Orchestrator::run_single`] - one definition picked interactively
//! - [`Orchestrator::run_by_name`] - one definition by name
//! - [`Orchestrator::run_group`] - a group, sequentially, as a split chain
//!
//! Configuration is fetched from the provider on every trigger. Public entry
//! points never return errors: a failure is reported once through
//! [`HostUi::show_error`] and the trigger ends with an empty [`RunReport`].
//! Terminals spawned before a failure are left open.

use futures::future::join_all;
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{init_config, require_root, ConfigLoader, ConfigProvider};
use crate::error::{Error, Result};
use crate::host::HostUi;
use crate::models::{Configuration, TerminalHandle, TerminalId, Trigger};
use crate::runner::TerminalRunner;
use crate::substitution::{SubstitutionMap, SubstitutionResolver};

/// Number of "kill active terminal" requests issued by [`Orchestrator::kill_all`]
pub const KILL_SWEEP: usize = 25;

/// Outcome of a trigger
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Handles produced, in collection order
    pub handles: Vec<TerminalHandle>,
    /// Terminal brought forward afterwards, if any
    pub shown: Option<TerminalId>,
}

impl RunReport {
    /// A report for a trigger that ran nothing
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Pick the handle to show after a multi-terminal trigger
///
/// The first handle, in collection order, whose definition asked to be
/// opened or focused.
pub fn focus_candidate(handles: &[TerminalHandle]) -> Option<&TerminalHandle> {
    handles.iter().find(|handle| handle.intent.wants_display())
}

/// Entry points for every trigger
pub struct Orchestrator {
    provider: Arc<dyn ConfigProvider>,
    resolver: Arc<dyn SubstitutionResolver>,
    runner: TerminalRunner,
    ui: Arc<dyn HostUi>,
    root: Option<PathBuf>,
}

impl Orchestrator {
    /// Create an orchestrator for the workspace at `root`
    pub fn new(
        provider: Arc<dyn ConfigProvider>,
        resolver: Arc<dyn SubstitutionResolver>,
        runner: TerminalRunner,
        ui: Arc<dyn HostUi>,
        root: Option<PathBuf>,
    ) -> Self {
        Self {
            provider,
            resolver,
            runner,
            ui,
            root,
        }
    }

    /// Workspace root, if a project is open
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// The runner used for every definition
    pub fn runner(&self) -> &TerminalRunner {
        &self.runner
    }

    /// Run every batch-eligible definition
    ///
    /// `substitutions` overrides the resolver for this batch.
    pub async fn run_all(&self, substitutions: Option<SubstitutionMap>) -> RunReport {
        info!("Running all terminals");
        let result = self.try_run_all(substitutions).await;
        self.finish(result).await
    }

    /// Run the batch if the configuration enables autorun
    pub async fn autorun(&self) -> RunReport {
        match self.provider.load(self.root()) {
            Ok(config) if config.autorun => {
                info!("Autorun enabled, running all terminals");
                self.finish(self.run_batch(&config, None).await).await
            }
            Ok(_) => {
                debug!("Autorun disabled");
                RunReport::empty()
            }
            Err(e) => self.finish(Err(e)).await,
        }
    }

    /// Let the user pick one definition and run it
    ///
    /// A dismissed pick is a silent no-op.
    pub async fn run_single(&self) -> RunReport {
        info!("Running a single terminal");
        let result = self.try_pick_single().await;
        match result {
            Ok(Some(name)) => self.run_by_name(&name).await,
            Ok(None) => {
                debug!("Terminal selection cancelled");
                RunReport::empty()
            }
            Err(e) => self.finish(Err(e)).await,
        }
    }

    /// Run the first definition named `name`
    ///
    /// The terminal is shown according to the definition's own display
    /// intent. An unknown name is a no-op.
    pub async fn run_by_name(&self, name: &str) -> RunReport {
        info!("Running terminal '{}'", name);
        let result = self.try_run_by_name(name).await;
        self.finish(result).await
    }

    /// Run every member of a group as a chain of split terminals
    ///
    /// Without `group`, the user picks one of the configured group names.
    pub async fn run_group(&self, group: Option<&str>) -> RunReport {
        info!("Running terminal group {}", group.unwrap_or("(pick)"));
        let result = self.try_run_group(group).await;
        self.finish(result).await
    }

    /// Write the default configuration unless one exists
    ///
    /// Returns the configuration path, or `None` after reporting an error.
    pub async fn init_config(&self) -> Option<PathBuf> {
        let result = self.try_init_config().map(|(path, _)| path);
        self.report(result).await
    }

    /// Make sure the configuration exists, then open it for editing
    pub async fn edit_config(&self) -> Option<PathBuf> {
        let result = match self.try_init_config() {
            Ok((path, _)) => self.ui.open_file(&path).await.map(|_| path),
            Err(e) => Err(e),
        };
        self.report(result).await
    }

    /// Best-effort sweep of the host's terminals
    ///
    /// Issues a fixed number of "kill active terminal" requests regardless of
    /// how many terminals are open. Returns how many were accepted.
    pub async fn kill_all(&self) -> usize {
        let mut killed = 0;
        for _ in 0..KILL_SWEEP {
            match self.runner.host().kill_active().await {
                Ok(()) => killed += 1,
                Err(e) => trace!("Kill request rejected: {}", e),
            }
        }
        info!("Kill sweep accepted {} of {} requests", killed, KILL_SWEEP);
        killed
    }

    async fn try_run_all(&self, substitutions: Option<SubstitutionMap>) -> Result<RunReport> {
        let config = self.provider.load(self.root())?;
        self.run_batch(&config, substitutions).await
    }

    async fn run_batch(
        &self,
        config: &Configuration,
        substitutions: Option<SubstitutionMap>,
    ) -> Result<RunReport> {
        let terminals = config.eligible(Trigger::Batch);
        if terminals.is_empty() {
            return Err(Error::NoTerminalsDefined);
        }

        let substitutions = substitutions.unwrap_or_else(|| self.resolver.resolve(self.root()));
        let root = self.root();
        let substitutions = &substitutions;

        let handles: Vec<TerminalHandle> = join_all(
            terminals
                .into_iter()
                .map(|terminal| self.runner.run(terminal, config, root, substitutions, None)),
        )
        .await
        .into_iter()
        .flatten()
        .collect();

        debug!("Batch produced {} terminals", handles.len());
        Ok(self.show_focus_candidate(handles).await)
    }

    async fn try_pick_single(&self) -> Result<Option<String>> {
        let config = self.provider.load(self.root())?;
        let terminals = config.eligible(Trigger::SinglePick);
        if terminals.is_empty() {
            return Err(Error::NoTerminalsDefined);
        }

        let items: Vec<String> = terminals.iter().map(|t| t.name.clone()).collect();
        let selected = self.ui.pick("Select a terminal...", &items).await;
        Ok(selected.and_then(|index| items.get(index).cloned()))
    }

    async fn try_run_by_name(&self, name: &str) -> Result<RunReport> {
        let config = self.provider.load(self.root())?;
        let Some(terminal) = config.find_by_name(name) else {
            warn!("No terminal named '{}'", name);
            return Ok(RunReport::empty());
        };

        let substitutions = self.resolver.resolve(self.root());
        let Some(handle) = self
            .runner
            .run(terminal, &config, self.root(), &substitutions, None)
            .await
        else {
            return Ok(RunReport::empty());
        };

        let shown = if terminal.display.wants_display() {
            self.show(&handle).await
        } else {
            None
        };

        Ok(RunReport {
            handles: vec![handle],
            shown,
        })
    }

    async fn try_run_group(&self, group: Option<&str>) -> Result<RunReport> {
        let config = self.provider.load(self.root())?;

        let group = match group {
            Some(group) => group.to_string(),
            None => {
                let names: Vec<String> =
                    config.group_names().into_iter().map(String::from).collect();
                if names.is_empty() {
                    return Err(Error::NoGroupSelected);
                }
                let selected = self.ui.pick("Select a group", &names).await;
                selected
                    .and_then(|index| names.get(index).cloned())
                    .ok_or(Error::NoGroupSelected)?
            }
        };

        let members = config.group_members(&group);
        if members.is_empty() {
            return Err(Error::GroupNotFound { group });
        }

        debug!("Group '{}' has {} members", group, members.len());
        let substitutions = self.resolver.resolve(self.root());
        let root = self.root();
        let (config, substitutions) = (&config, &substitutions);

        // Each member splits from the last terminal the chain produced.
        let (_, handles) = stream::iter(members)
            .fold(
                (None::<TerminalHandle>, Vec::new()),
                |(parent, mut handles), terminal| async move {
                    let handle = self
                        .runner
                        .run(terminal, config, root, substitutions, parent.as_ref())
                        .await;
                    match handle {
                        Some(handle) => {
                            handles.push(handle.clone());
                            (Some(handle), handles)
                        }
                        None => {
                            warn!("Group member '{}' produced no terminal", terminal.name);
                            (parent, handles)
                        }
                    }
                },
            )
            .await;

        Ok(self.show_focus_candidate(handles).await)
    }

    fn try_init_config(&self) -> Result<(PathBuf, bool)> {
        let root = require_root(self.root())?;
        let path = self.provider.config_path(root);
        let loader = ConfigLoader::new().with_relative_path(&path);
        let created = init_config(&loader, &path)?;
        Ok((path, created))
    }

    async fn show_focus_candidate(&self, handles: Vec<TerminalHandle>) -> RunReport {
        let shown = match focus_candidate(&handles) {
            Some(handle) => self.show(handle).await,
            None => {
                debug!("No terminal asked to be shown");
                None
            }
        };
        RunReport { handles, shown }
    }

    async fn show(&self, handle: &TerminalHandle) -> Option<TerminalId> {
        let preserve_focus = handle.intent.preserve_focus();
        match self.runner.host().show(&handle.id, preserve_focus).await {
            Ok(()) => {
                debug!(
                    "Showing '{}' ({})",
                    handle.name,
                    if preserve_focus { "open" } else { "focus" }
                );
                Some(handle.id.clone())
            }
            Err(e) => {
                warn!("Failed to show terminal '{}': {}", handle.name, e);
                None
            }
        }
    }

    async fn finish(&self, result: Result<RunReport>) -> RunReport {
        self.report(result).await.unwrap_or_default()
    }

    async fn report<T>(&self, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Trigger aborted: {}", e);
                self.ui.show_error(&e.user_message()).await;
                None
            }
        }
    }
}
