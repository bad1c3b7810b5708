//! The scouter itself: wires every component together and exposes the entry
//! points the host calls from its client context.
//!
//! ## Threading
//!
//! [`WorldScouter`] is owned by the host and only ever touched from the host's
//! client context. Timers and network completions run on the tokio pool and
//! reach back through a [`ClientThread`] handle; their work is applied the
//! next time the host calls any entry point (or [`WorldScouter::run_client_tasks`]).
//!
//! Once [`WorldScouter::shut_down`] has run, a liveness flag turns every
//! late completion into a no-op.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::ConfigHandle;
use crate::detector::{DetectorOutcome, RegionChangeDetector, RegionTrigger, TickSample};
use crate::dispatch::{client_thread, ClientQueue, ClientThread};
use crate::error::{Result, ScouterError};
use crate::host::{GameClient, GameState, HostAccess, Presenter, WorldListProvider};
use crate::metadata::MetadataCache;
use crate::premove::{self, PremoveContext, PremoveIndicator};
use crate::remote::{InstanceBackend, InstanceInfoService};
use crate::schedule::{spawn_periodic, Shutdown};
use crate::types::{Coordinate, InstanceReport, RegionId};
use crate::view::{SortKey, ViewReader, WorldListView};

// ============================================================================
// Collaborators
// ============================================================================

/// Everything the host supplies at start-up.
#[derive(Clone)]
pub struct Collaborators {
    pub client: Arc<dyn GameClient>,
    pub worlds: Arc<dyn WorldListProvider>,
    pub backend: Arc<dyn InstanceBackend>,
    pub presenter: Arc<dyn Presenter>,
}

/// State that may only be touched on the client context.
pub struct ClientState {
    client: Arc<dyn GameClient>,
    presenter: Arc<dyn Presenter>,
    detector: RegionChangeDetector,
    view: WorldListView,
}

impl HostAccess for ClientState {
    fn game_client(&self) -> &Arc<dyn GameClient> {
        &self.client
    }
}

/// State reachable from timers and network completions.
struct Shared {
    client: Arc<dyn GameClient>,
    worlds: Arc<dyn WorldListProvider>,
    metadata: Arc<MetadataCache>,
    service: InstanceInfoService,
    client_thread: ClientThread<ClientState>,
    runtime: Handle,
    alive: AtomicBool,
}

impl Shared {
    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    fn refresh_worlds(self: &Arc<Self>) -> bool {
        if !self.is_alive() {
            return false;
        }
        let alive = Arc::clone(self);
        self.metadata.refresh(
            self.client.as_ref(),
            self.worlds.as_ref(),
            &self.client_thread,
            move || alive.is_alive(),
        )
    }

    fn refresh_instances(self: &Arc<Self>) -> JoinHandle<()> {
        let shared = Arc::clone(self);
        self.service.fetch_all(move |result| {
            if !shared.is_alive() {
                debug!("Dropping world info fetched after shutdown");
                return;
            }

            let metadata = Arc::clone(&shared.metadata);
            let alive = Arc::clone(&shared);
            shared.client_thread.invoke_later(move |state: &mut ClientState| {
                if !alive.is_alive() {
                    return;
                }
                // A failed fetch keeps the current list and only re-renders it.
                if let Ok(records) = result {
                    state.view.populate(&records, &metadata.snapshot());
                }
                state.presenter.world_list_updated(&state.view.snapshot());
            });
        })
    }
}

// ============================================================================
// World Scouter
// ============================================================================

pub struct WorldScouter {
    state: ClientState,
    queue: ClientQueue<ClientState>,
    shared: Arc<Shared>,
    config: ConfigHandle,
    shutdown: Shutdown,
    timers: Vec<JoinHandle<()>>,
}

impl WorldScouter {
    /// Builds the scouter and starts it.
    ///
    /// The first world-list read is queued on the client context and waits
    /// until the host reaches its login screen. Both refresh timers start on
    /// `runtime` with the delays and periods from the `[schedule]` table.
    ///
    /// # Arguments
    ///
    /// * `collaborators` - Game client, world list, backend and presenter
    /// * `config` - Live configuration; indicator settings are re-read on
    ///   every evaluation, the schedule only here
    /// * `runtime` - Runtime that carries timers and network requests
    ///
    /// # Returns
    ///
    /// The running scouter, or [`ScouterError::Config`] if the configuration
    /// fails validation. Nothing is started in that case.
    pub fn start_up(
        collaborators: Collaborators,
        config: ConfigHandle,
        runtime: Handle,
    ) -> Result<Self> {
        let settings = config.snapshot();
        settings.validate()?;

        let (handle, queue) = client_thread::<ClientState>();
        let shared = Arc::new(Shared {
            client: Arc::clone(&collaborators.client),
            worlds: collaborators.worlds,
            metadata: Arc::new(MetadataCache::new()),
            service: InstanceInfoService::new(collaborators.backend, runtime.clone()),
            client_thread: handle,
            runtime: runtime.clone(),
            alive: AtomicBool::new(true),
        });

        let initial = Arc::clone(&shared);
        shared.client_thread.invoke_until(move |state: &mut ClientState| {
            if !initial.is_alive() {
                return true;
            }
            if !state.client.game_state().at_least(GameState::LoginScreen) {
                return false;
            }
            let shared = Arc::clone(&initial);
            initial.runtime.spawn_blocking(move || shared.refresh_worlds());
            true
        });

        let shutdown = Shutdown::new();
        let schedule = &settings.schedule;

        let worlds_job = Arc::clone(&shared);
        let world_timer = spawn_periodic(
            &runtime,
            "world-refresh",
            schedule.world_refresh_delay(),
            schedule.world_refresh_period(),
            &shutdown,
            move || {
                worlds_job.refresh_worlds();
            },
        );

        let instances_job = Arc::clone(&shared);
        let instance_timer = spawn_periodic(
            &runtime,
            "instance-refresh",
            schedule.instance_refresh_delay(),
            schedule.instance_refresh_period(),
            &shutdown,
            move || {
                if instances_job.is_alive() {
                    instances_job.refresh_instances();
                }
            },
        );

        info!("🔭 World scouter started");

        Ok(Self {
            state: ClientState {
                client: collaborators.client,
                presenter: collaborators.presenter,
                detector: RegionChangeDetector::new(),
                view: WorldListView::new(),
            },
            queue,
            shared,
            config,
            shutdown,
            timers: vec![world_timer, instance_timer],
        })
    }

    /// Runs work handed back from timers and network completions.
    pub fn run_client_tasks(&mut self) -> usize {
        self.queue.drain(&mut self.state)
    }

    pub fn is_alive(&self) -> bool {
        self.shared.is_alive()
    }

    /// Per-tick hook.
    pub fn on_game_tick(&mut self) {
        self.run_client_tasks();
        if !self.is_alive() {
            return;
        }

        let client = Arc::clone(&self.state.client);
        let Some(position) = client.player_position() else {
            return;
        };
        let sample = TickSample {
            instanced: client.is_instanced(),
            position,
        };

        let outcome = self.state.detector.observe(sample, || {
            client
                .template_position()
                .map_or(RegionId::NONE, Coordinate::region_id)
        });

        match outcome {
            DetectorOutcome::Triggered(trigger) => self.report_instance(trigger),
            DetectorOutcome::LeftInstance => self.state.presenter.hide_premove(),
            DetectorOutcome::Idle | DetectorOutcome::Unchanged => {}
        }
    }

    pub fn on_game_state_changed(&mut self, state: GameState) {
        self.run_client_tasks();
        if !self.is_alive() {
            return;
        }
        if state == GameState::Loading {
            self.state.detector.arm();
        }
    }

    /// The host's world list changed. The refresh runs on the blocking pool.
    pub fn on_worlds_changed(&mut self) -> JoinHandle<bool> {
        self.run_client_tasks();
        let shared = Arc::clone(&self.shared);
        self.shared
            .runtime
            .spawn_blocking(move || shared.refresh_worlds())
    }

    /// Selects a sort column and re-renders.
    pub fn set_sort(&mut self, key: SortKey) {
        self.run_client_tasks();
        if !self.is_alive() {
            return;
        }
        self.state.view.set_sort(key);
        self.state
            .presenter
            .world_list_updated(&self.state.view.snapshot());
    }

    /// Fetches the instance list now instead of waiting for the timer.
    ///
    /// The result lands on the client context with a later drain. Fails with
    /// [`ScouterError::ShutDown`] once the scouter has been torn down.
    pub fn refresh_instances(&mut self) -> Result<JoinHandle<()>> {
        self.run_client_tasks();
        if !self.is_alive() {
            return Err(ScouterError::ShutDown);
        }
        Ok(self.shared.refresh_instances())
    }

    /// Read-only handle onto the world list, usable from any thread.
    pub fn view(&self) -> ViewReader {
        self.state.view.reader()
    }

    pub fn metadata(&self) -> &Arc<MetadataCache> {
        &self.shared.metadata
    }

    pub fn config(&self) -> &ConfigHandle {
        &self.config
    }

    /// Whether both refresh timers have stopped.
    pub fn timers_finished(&self) -> bool {
        self.timers.iter().all(JoinHandle::is_finished)
    }

    /// Stops the timers, hides the indicator and turns late completions into
    /// no-ops. Calling it twice is harmless.
    pub fn shut_down(&mut self) {
        if !self.shared.alive.swap(false, Ordering::AcqRel) {
            return;
        }
        self.shutdown.trigger();
        self.state.presenter.hide_premove();
        info!("🛑 World scouter shut down");
    }

    fn report_instance(&self, trigger: RegionTrigger) {
        let client = &self.state.client;
        if trigger.template_region_id.is_none() {
            warn!(
                "No template region for instance at {:?}; not reporting world {}",
                trigger.position,
                client.world()
            );
        } else {
            let report =
                InstanceReport::new(client.world(), trigger.position, trigger.template_region_id);
            self.shared.service.submit(report);
        }

        let settings = self.config.snapshot();
        let context = PremoveContext {
            template_region_id: trigger.template_region_id,
            carrying_scroller: client.inventory_contains(settings.indicator.scroller_item),
        };

        let presenter = &self.state.presenter;
        let Some(evaluation) = premove::evaluate(trigger.position.y, &settings.indicator, &context) else {
            presenter.hide_premove();
            return;
        };

        let indicator = PremoveIndicator::new(evaluation, &settings.indicator);
        if indicator.show_info_box {
            presenter.show_premove(&indicator);
        } else {
            presenter.hide_premove();
        }
        if indicator.show_chat {
            presenter.chat_message(&indicator.chat_message());
        }
    }
}

impl Drop for WorldScouter {
    fn drop(&mut self) {
        self.shared.alive.store(false, Ordering::Release);
        self.shutdown.trigger();
    }
}
