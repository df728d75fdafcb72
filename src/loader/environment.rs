//! Execution environment handed to a package image
//!
//! Every cache miss builds a fresh `Environment`. Its bootstrap namespace
//! starts out buffering startup hooks; the orchestrator drains them after
//! the image has loaded and then flips the bootstrap to live, after which
//! hooks run as soon as they are registered.

use crate::error::{UniloadError, UniloadResult};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;
use tracing::debug;
use uuid::Uuid;

/// Context tag marking a non-interactive package load (as opposed to a
/// server request context)
pub const CONTEXT_TAG: &str = "non-interactive-load";

/// Zero-argument callback registered by package initialization code
pub type StartupHook = Box<dyn FnOnce() -> UniloadResult<()>>;

/// Hook lifecycle mode of a bootstrap namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapMode {
    /// Registrations are queued until the orchestrator drains them
    Buffering,

    /// Registrations run immediately. Terminal.
    Live,
}

struct QueuedHook {
    package: String,
    hook: StartupHook,
}

struct BootstrapState {
    mode: BootstrapMode,
    queue: VecDeque<QueuedHook>,
}

/// Handle to an environment's bootstrap namespace.
///
/// Cloning yields another handle to the same namespace, so package code can
/// keep one around and register hooks after the load has finished.
#[derive(Clone)]
pub struct Bootstrap {
    state: Rc<RefCell<BootstrapState>>,
}

impl Bootstrap {
    fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(BootstrapState {
                mode: BootstrapMode::Buffering,
                queue: VecDeque::new(),
            })),
        }
    }

    pub fn mode(&self) -> BootstrapMode {
        self.state.borrow().mode
    }

    /// Number of hooks waiting for the drain
    pub fn pending_hooks(&self) -> usize {
        self.state.borrow().queue.len()
    }

    /// Register a startup hook on behalf of `package`.
    ///
    /// While buffering the hook is queued and `Ok(())` is returned. Once
    /// live the hook runs right away and its outcome is returned.
    pub fn on_startup<F>(&self, package: &str, hook: F) -> UniloadResult<()>
    where
        F: FnOnce() -> UniloadResult<()> + 'static,
    {
        let mut state = self.state.borrow_mut();
        match state.mode {
            BootstrapMode::Buffering => {
                state.queue.push_back(QueuedHook {
                    package: package.to_string(),
                    hook: Box::new(hook),
                });
                Ok(())
            }
            BootstrapMode::Live => {
                // Release the borrow: the hook may register further hooks.
                drop(state);
                run_hook(package, Box::new(hook))
            }
        }
    }

    /// Run queued hooks front to back until the queue is empty.
    ///
    /// Hooks queued by a running hook are picked up in the same pass. The
    /// first failing hook stops the drain; the rest never run.
    pub(crate) fn drain(&self) -> UniloadResult<usize> {
        let mut ran = 0;
        loop {
            let next = self.state.borrow_mut().queue.pop_front();
            let Some(QueuedHook { package, hook }) = next else {
                break;
            };
            run_hook(&package, hook)?;
            ran += 1;
        }
        Ok(ran)
    }

    /// One-way switch to `Live`
    pub(crate) fn go_live(&self) {
        let mut state = self.state.borrow_mut();
        debug_assert!(state.queue.is_empty(), "going live with queued hooks");
        state.mode = BootstrapMode::Live;
    }
}

impl fmt::Debug for Bootstrap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Bootstrap")
            .field("mode", &state.mode)
            .field("pending_hooks", &state.queue.len())
            .finish()
    }
}

fn run_hook(package: &str, hook: StartupHook) -> UniloadResult<()> {
    debug!("Running startup hook for {}", package);
    hook().map_err(|e| UniloadError::startup_hook(package, e))
}

/// Config namespace visible to package code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    context_tag: &'static str,
}

impl RuntimeConfig {
    pub fn context_tag(&self) -> &str {
        self.context_tag
    }

    /// True for the non-interactive loading context built by `Environment::build`
    pub fn is_load_context(&self) -> bool {
        self.context_tag == CONTEXT_TAG
    }
}

/// Execution context for one image load
#[derive(Debug)]
pub struct Environment {
    id: Uuid,
    bootstrap: Bootstrap,
    config: RuntimeConfig,
}

impl Environment {
    /// Build a fresh environment: empty hook queue, buffering, load context tag
    pub fn build() -> Self {
        let env = Self {
            id: Uuid::new_v4(),
            bootstrap: Bootstrap::new(),
            config: RuntimeConfig {
                context_tag: CONTEXT_TAG,
            },
        };
        debug!("Built load environment {}", env.id);
        env
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn bootstrap(&self) -> &Bootstrap {
        &self.bootstrap
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }
}
