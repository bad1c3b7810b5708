//! In-memory stand-ins for the host and the backend, shared by unit tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::{Result, ScouterError};
use crate::host::{
    ChatMessage, GameClient, GameState, HostAccess, Presenter, WorldListProvider, WorldLocationTable,
};
use crate::premove::PremoveIndicator;
use crate::remote::InstanceBackend;
use crate::types::{Coordinate, ItemId, RawInstanceRecord, WorldId, WorldMetadata, WorldUpdate};
use crate::view::ViewState;

// ============================================================================
// Host client
// ============================================================================

#[derive(Debug)]
struct ClientFacts {
    game_state: GameState,
    world: WorldId,
    position: Option<Coordinate>,
    instanced: bool,
    template: Option<Coordinate>,
    inventory: Vec<ItemId>,
    locations: Vec<(WorldId, i32)>,
}

/// Scriptable game client. Starts logged in on world 302, outside any instance.
#[derive(Debug)]
pub struct FakeClient {
    facts: Mutex<ClientFacts>,
    location_reads: AtomicUsize,
}

impl FakeClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            facts: Mutex::new(ClientFacts {
                game_state: GameState::LoggedIn,
                world: WorldId(302),
                position: Some(Coordinate::new(3200, 3200)),
                instanced: false,
                template: None,
                inventory: Vec::new(),
                locations: Vec::new(),
            }),
            location_reads: AtomicUsize::new(0),
        })
    }

    pub fn set_game_state(&self, state: GameState) {
        self.facts.lock().unwrap().game_state = state;
    }

    pub fn set_locations(&self, locations: Vec<(WorldId, i32)>) {
        self.facts.lock().unwrap().locations = locations;
    }

    pub fn set_instance(&self, position: Coordinate, template: Coordinate) {
        let mut facts = self.facts.lock().unwrap();
        facts.position = Some(position);
        facts.instanced = true;
        facts.template = Some(template);
    }

    /// Keeps the player instanced but drops the template transform.
    pub fn clear_template(&self) {
        self.facts.lock().unwrap().template = None;
    }

    pub fn leave_instance(&self, position: Coordinate) {
        let mut facts = self.facts.lock().unwrap();
        facts.position = Some(position);
        facts.instanced = false;
        facts.template = None;
    }

    pub fn give_item(&self, item: ItemId) {
        self.facts.lock().unwrap().inventory.push(item);
    }

    pub fn location_reads(&self) -> usize {
        self.location_reads.load(Ordering::SeqCst)
    }
}

impl GameClient for FakeClient {
    fn game_state(&self) -> GameState {
        self.facts.lock().unwrap().game_state
    }

    fn world(&self) -> WorldId {
        self.facts.lock().unwrap().world
    }

    fn player_position(&self) -> Option<Coordinate> {
        self.facts.lock().unwrap().position
    }

    fn is_instanced(&self) -> bool {
        self.facts.lock().unwrap().instanced
    }

    fn template_position(&self) -> Option<Coordinate> {
        self.facts.lock().unwrap().template
    }

    fn inventory_contains(&self, item: ItemId) -> bool {
        self.facts.lock().unwrap().inventory.contains(&item)
    }

    fn world_locations(&self) -> Option<WorldLocationTable> {
        self.location_reads.fetch_add(1, Ordering::SeqCst);
        Some(self.facts.lock().unwrap().locations.iter().copied().collect())
    }
}

/// Client-context state that only carries the game client.
pub struct HostOnly {
    client: Arc<dyn GameClient>,
}

impl HostOnly {
    pub fn new(client: Arc<FakeClient>) -> Self {
        Self { client }
    }
}

impl HostAccess for HostOnly {
    fn game_client(&self) -> &Arc<dyn GameClient> {
        &self.client
    }
}

// ============================================================================
// World list
// ============================================================================

pub struct FakeWorlds {
    worlds: Option<Vec<WorldMetadata>>,
    calls: AtomicUsize,
}

impl FakeWorlds {
    pub fn new(worlds: Vec<WorldMetadata>) -> Self {
        Self {
            worlds: Some(worlds),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            worlds: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl WorldListProvider for FakeWorlds {
    fn worlds(&self) -> Option<Vec<WorldMetadata>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.worlds.clone()
    }
}

// ============================================================================
// Presenter
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenterEvent {
    Render(usize),
    ShowPremove(String),
    HidePremove,
    Chat(String),
}

#[derive(Debug, Default)]
pub struct RecordingPresenter {
    events: Mutex<Vec<PresenterEvent>>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PresenterEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn renders(&self) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| matches!(e, PresenterEvent::Render(_)))
            .count()
    }

    fn push(&self, event: PresenterEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl Presenter for RecordingPresenter {
    fn world_list_updated(&self, view: &ViewState) {
        self.push(PresenterEvent::Render(view.records.len()));
    }

    fn show_premove(&self, indicator: &PremoveIndicator) {
        self.push(PresenterEvent::ShowPremove(indicator.text().to_string()));
    }

    fn hide_premove(&self) {
        self.push(PresenterEvent::HidePremove);
    }

    fn chat_message(&self, message: &ChatMessage) {
        self.push(PresenterEvent::Chat(message.text.clone()));
    }
}

// ============================================================================
// Backend
// ============================================================================

#[derive(Debug, Default)]
struct BackendScript {
    records: Vec<RawInstanceRecord>,
    submit_status: Option<u16>,
    fetch_error: Option<ScouterError>,
    submissions: Vec<(WorldId, WorldUpdate)>,
    submit_attempts: usize,
}

/// Backend that keeps everything in memory and fails on request.
#[derive(Debug, Default)]
pub struct FakeBackend {
    script: Mutex<BackendScript>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_records(&self, records: Vec<RawInstanceRecord>) {
        let mut script = self.script.lock().unwrap();
        script.records = records;
        script.fetch_error = None;
    }

    pub fn fail_submits_with(&self, status: u16) {
        self.script.lock().unwrap().submit_status = Some(status);
    }

    pub fn fail_fetches_with(&self, error: ScouterError) {
        self.script.lock().unwrap().fetch_error = Some(error);
    }

    pub fn submissions(&self) -> Vec<(WorldId, WorldUpdate)> {
        self.script.lock().unwrap().submissions.clone()
    }

    pub fn submit_attempts(&self) -> usize {
        self.script.lock().unwrap().submit_attempts
    }
}

/// Copies the variants tests script; the rest become transport errors.
fn replay(error: &ScouterError) -> ScouterError {
    match error {
        ScouterError::NetworkStatus(code) => ScouterError::NetworkStatus(*code),
        ScouterError::EmptyBody => ScouterError::EmptyBody,
        other => ScouterError::NetworkTransport(other.to_string()),
    }
}

#[async_trait]
impl InstanceBackend for FakeBackend {
    async fn put_world(&self, world: WorldId, update: WorldUpdate) -> Result<()> {
        let mut script = self.script.lock().unwrap();
        script.submit_attempts += 1;
        if let Some(status) = script.submit_status {
            return Err(ScouterError::NetworkStatus(status));
        }
        script.submissions.push((world, update));
        Ok(())
    }

    async fn fetch_worlds(&self) -> Result<Vec<RawInstanceRecord>> {
        let script = self.script.lock().unwrap();
        match &script.fetch_error {
            Some(error) => Err(replay(error)),
            None => Ok(script.records.clone()),
        }
    }
}
