//! # Assistant
//!
//! Application state and every user-facing operation. The REPL and the
//! reminder scheduler share one `Arc<Assistant>`.
//!
//! The state lock is never held across a generator call: operations mutate
//! and persist, release the lock, await the model, then re-lock to append the
//! reply to the session that asked for it. At most one chat generation is in
//! flight; a second request while one is running is ignored.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.2.0: Calendar, garden planner and export operations
//! - 1.1.0: Watering reminders and notification permission
//! - 1.0.0: Chat sessions, image identification, edits and feedback

use anyhow::{anyhow, bail, Result};
use chrono::{DateTime, Duration, Local, Utc};
use log::{debug, error, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::core::{truncate_title, Clock};
use crate::database::{Database, ACTIVE_CHAT_KEY, HISTORY_KEY, REMINDERS_KEY};
use crate::features::calendar::{calendar_prompt, parse_calendar, CalendarTask, GENERATION_FAILED_MESSAGE};
use crate::features::export::{
    export_filename, format_chat_text, write_export, ExportFormat, PaginatedDocument,
};
use crate::features::garden::{GardenPlanner, EMPTY_GARDEN_MESSAGE, SUGGESTIONS_FAILED_MESSAGE};
use crate::features::generator::{
    generate_or_fallback, parse_identification, ContentGenerator, ImagePart, FALLBACK_MESSAGE,
    IDENTIFICATION_PROMPT, REGENERATE_FALLBACK_MESSAGE, UPLOAD_CAPTION,
};
use crate::features::reminders::{check_due, FiredReminder, NotificationPermission, Notifier, Reminder};
use crate::features::sessions::{
    ChatMessage, ChatSession, IdentificationFeedback, SessionStore, PLANT_ANALYSIS_TITLE,
};
use crate::features::weather::WeatherStatus;

pub const PERMISSION_REFUSED_MESSAGE: &str =
    "You need to grant notification permission to set reminders.";
pub const PERMISSION_NOT_GRANTED_MESSAGE: &str =
    "Notification permission is not granted. Set NOTIFICATION_PERMISSION=granted to enable reminders.";

/// Everything the assistant remembers between commands
#[derive(Debug, Default)]
pub struct AppState {
    pub sessions: SessionStore,
    pub reminders: Vec<Reminder>,
    pub weather: WeatherStatus,
    /// Prefix the next chat message with the current weather
    pub weather_context: bool,
    pub calendar: Option<Vec<CalendarTask>>,
    pub garden: Option<GardenPlanner>,
}

/// Clears the loading flag when the generation it guards finishes
struct LoadingGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Copy an unreadable stored value aside before anything can overwrite it
///
/// Keys whose backup fails are added to `frozen` and not written this session.
fn keep_unreadable(database: &Database, key: &'static str, frozen: &mut Vec<&'static str>) {
    match database.preserve_unreadable(key) {
        Ok(Some(backup)) => warn!("Kept the unreadable value of '{key}' under '{backup}'"),
        Ok(None) => {}
        Err(e) => {
            error!("Could not back up '{key}', leaving it untouched: {e:#}");
            frozen.push(key);
        }
    }
}

fn load_key<T: DeserializeOwned>(
    database: &Database,
    key: &'static str,
    frozen: &mut Vec<&'static str>,
) -> Option<T> {
    match database.get_json::<T>(key) {
        Ok(value) => value,
        Err(e) => {
            error!("Failed to load '{key}' from storage: {e:#}");
            keep_unreadable(database, key, frozen);
            None
        }
    }
}

/// Decode a stored JSON array entry by entry, skipping entries that do not decode
fn load_list<T: DeserializeOwned>(
    database: &Database,
    key: &'static str,
    frozen: &mut Vec<&'static str>,
) -> Vec<T> {
    let entries: Vec<Value> = load_key(database, key, frozen).unwrap_or_default();
    let total = entries.len();

    let items: Vec<T> = entries
        .into_iter()
        .enumerate()
        .filter_map(|(i, entry)| match serde_json::from_value(entry) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!("Skipping unreadable entry {i} of '{key}': {e}");
                None
            }
        })
        .collect();

    if items.len() < total {
        keep_unreadable(database, key, frozen);
    }
    items
}

pub struct Assistant {
    state: Mutex<AppState>,
    loading: AtomicBool,
    generator: Arc<dyn ContentGenerator>,
    database: Database,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    /// Keys holding unreadable data that could not be backed up
    frozen_keys: Vec<&'static str>,
}

impl Assistant {
    /// Restore history, active chat and reminders from storage
    ///
    /// Unreadable entries are logged and skipped; the stored value they came
    /// from is copied to a `.unreadable` key before the first save.
    pub fn load(
        generator: Arc<dyn ContentGenerator>,
        database: Database,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let mut frozen_keys = Vec::new();
        let sessions: Vec<ChatSession> = load_list(&database, HISTORY_KEY, &mut frozen_keys);
        let active_id: Option<String> =
            load_key::<Option<String>>(&database, ACTIVE_CHAT_KEY, &mut frozen_keys).flatten();
        let reminders: Vec<Reminder> = load_list(&database, REMINDERS_KEY, &mut frozen_keys);

        info!(
            "Loaded {} chat(s) and {} reminder(s) from storage",
            sessions.len(),
            reminders.len()
        );

        let state = AppState {
            sessions: SessionStore::from_parts(sessions, active_id),
            reminders,
            ..AppState::default()
        };

        Self {
            state: Mutex::new(state),
            loading: AtomicBool::new(false),
            generator,
            database,
            notifier,
            clock,
            frozen_keys,
        }
    }

    fn persist(&self, state: &AppState) {
        self.write_key(HISTORY_KEY, state.sessions.sessions());
        self.write_key(ACTIVE_CHAT_KEY, &state.sessions.active_id());
        self.write_key(REMINDERS_KEY, &state.reminders);
    }

    fn write_key<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        if self.frozen_keys.iter().any(|frozen| *frozen == key) {
            debug!("Not saving '{key}': its stored value could not be read or backed up");
            return;
        }
        if let Err(e) = self.database.set_json(key, value) {
            error!("Failed to save '{key}' to storage: {e:#}");
        }
    }

    fn begin_loading(&self) -> Option<LoadingGuard<'_>> {
        self.loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| LoadingGuard { flag: &self.loading })
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn local_now(&self) -> DateTime<Local> {
        self.clock.now().with_timezone(&Local)
    }

    /// Append a reply to the session that asked for it, optionally retitling it
    async fn finish_exchange(&self, session_id: &str, reply: ChatMessage, title: Option<String>) {
        let mut state = self.state.lock().await;
        if let Some(title) = title {
            if let Err(e) = state.sessions.set_title(session_id, title) {
                warn!("Could not retitle chat: {e}");
            }
        }
        if let Err(e) = state.sessions.append(session_id, reply) {
            warn!("Dropping reply: {e}");
            return;
        }
        self.persist(&state);
    }

    // ---- sessions -------------------------------------------------------

    pub async fn new_chat(&self) -> String {
        let mut state = self.state.lock().await;
        let id = state.sessions.create(self.clock.now());
        self.persist(&state);
        id
    }

    /// Select by 1-based list position or id
    pub async fn select_chat(&self, reference: &str) -> Result<ChatSession> {
        let mut state = self.state.lock().await;
        let session = state
            .sessions
            .resolve(reference)
            .cloned()
            .ok_or_else(|| anyhow!("No chat matches '{reference}'"))?;
        state.sessions.select(&session.id);
        self.persist(&state);
        Ok(session)
    }

    /// Delete by 1-based list position or id; returns the removed session
    pub async fn delete_chat(&self, reference: &str) -> Result<ChatSession> {
        let mut state = self.state.lock().await;
        let session = state
            .sessions
            .resolve(reference)
            .cloned()
            .ok_or_else(|| anyhow!("No chat matches '{reference}'"))?;
        state.sessions.delete(&session.id);
        self.persist(&state);
        info!("Deleted chat {} ({})", session.id, session.title);
        Ok(session)
    }

    pub async fn sessions(&self) -> SessionStore {
        self.state.lock().await.sessions.clone()
    }

    pub async fn active_session(&self) -> Option<ChatSession> {
        self.state.lock().await.sessions.active().cloned()
    }

    // ---- chat -----------------------------------------------------------

    /// Send a chat message and wait for the reply
    ///
    /// Returns `Ok(None)` when the input is blank or another generation is running.
    pub async fn send_message(&self, input: &str) -> Result<Option<ChatMessage>> {
        if input.trim().is_empty() {
            return Ok(None);
        }
        let Some(_loading) = self.begin_loading() else {
            debug!("Ignoring message while a reply is pending");
            return Ok(None);
        };

        let (session_id, prompt) = {
            let mut state = self.state.lock().await;
            let prompt = match (state.weather_context, state.weather.weather) {
                (true, Some(weather)) => {
                    state.weather_context = false;
                    format!("{}{input}", weather.context_prefix())
                }
                _ => input.to_string(),
            };
            let session_id = state.sessions.begin_exchange(
                self.clock.now(),
                ChatMessage::user_text(prompt.clone()),
                &truncate_title(input),
            );
            self.persist(&state);
            (session_id, prompt)
        };

        let reply = generate_or_fallback(self.generator.as_ref(), &prompt, None, FALLBACK_MESSAGE).await;
        let reply = ChatMessage::model_text(reply);
        self.finish_exchange(&session_id, reply.clone(), None).await;
        Ok(Some(reply))
    }

    /// Read an image from disk and run the identification flow
    pub async fn upload_image(&self, path: &Path) -> Result<Option<ChatMessage>> {
        if self.is_loading() {
            return Ok(None);
        }
        let image = ImagePart::from_file(path).await?;
        self.identify(image).await
    }

    /// Identify the plant in `image`
    ///
    /// A well-formed reply becomes an identification message and renames the
    /// chat after the plant; anything else is kept as plain text.
    pub async fn identify(&self, image: ImagePart) -> Result<Option<ChatMessage>> {
        let Some(_loading) = self.begin_loading() else {
            debug!("Ignoring upload while a reply is pending");
            return Ok(None);
        };

        let session_id = {
            let mut state = self.state.lock().await;
            let id = state.sessions.begin_exchange(
                self.clock.now(),
                ChatMessage::user_image(UPLOAD_CAPTION, image.data_url()),
                PLANT_ANALYSIS_TITLE,
            );
            self.persist(&state);
            id
        };

        let (reply, title) = match self.generator.generate(IDENTIFICATION_PROMPT, Some(&image)).await {
            Ok(text) => match parse_identification(&text) {
                Some(identification) => {
                    info!(
                        "Identified {} ({}% confidence)",
                        identification.plant_name, identification.confidence
                    );
                    let title = identification.plant_name.clone();
                    (ChatMessage::identification(identification), Some(title))
                }
                None => (ChatMessage::model_text(text), None),
            },
            Err(e) => {
                error!("Plant identification failed: {e:#}");
                (ChatMessage::model_text(FALLBACK_MESSAGE), None)
            }
        };

        self.finish_exchange(&session_id, reply.clone(), title).await;
        Ok(Some(reply))
    }

    /// Replace a user message in the active chat and regenerate from there
    pub async fn save_edit(&self, index: usize, text: &str) -> Result<Option<ChatMessage>> {
        if text.trim().is_empty() {
            bail!("An edited message cannot be empty");
        }
        let Some(_loading) = self.begin_loading() else {
            return Ok(None);
        };

        let session_id = {
            let mut state = self.state.lock().await;
            let session_id = state
                .sessions
                .active_id()
                .map(str::to_string)
                .ok_or_else(|| anyhow!("There is no active chat"))?;
            state.sessions.edit_message(&session_id, index, text)?;
            self.persist(&state);
            session_id
        };

        let reply = generate_or_fallback(self.generator.as_ref(), text, None, REGENERATE_FALLBACK_MESSAGE).await;
        let reply = ChatMessage::model_text(reply);
        self.finish_exchange(&session_id, reply.clone(), None).await;
        Ok(Some(reply))
    }

    /// Mark an identification in the active chat as right or wrong
    pub async fn identification_feedback(
        &self,
        index: usize,
        feedback: IdentificationFeedback,
        corrected_name: Option<String>,
    ) -> Result<Option<String>> {
        let mut state = self.state.lock().await;
        let session_id = state
            .sessions
            .active_id()
            .map(str::to_string)
            .ok_or_else(|| anyhow!("There is no active chat"))?;
        let followup = state
            .sessions
            .attach_feedback(&session_id, index, feedback, corrected_name)?;
        self.persist(&state);
        Ok(followup)
    }

    // ---- weather --------------------------------------------------------

    pub async fn set_weather(&self, status: WeatherStatus) {
        self.state.lock().await.weather = status;
    }

    pub async fn weather(&self) -> WeatherStatus {
        self.state.lock().await.weather.clone()
    }

    pub async fn weather_context_enabled(&self) -> bool {
        self.state.lock().await.weather_context
    }

    /// Toggle weather context for the next message
    pub async fn set_weather_context(&self, enabled: bool) -> Result<()> {
        let mut state = self.state.lock().await;
        if enabled && state.weather.weather.is_none() {
            bail!("Weather is not available: {}", state.weather.summary());
        }
        state.weather_context = enabled;
        Ok(())
    }

    // ---- reminders ------------------------------------------------------

    /// Plant a new reminder is for: the explicit name, else the active chat's plant
    pub async fn reminder_plant_for(&self, explicit: Option<&str>) -> Option<String> {
        if let Some(name) = explicit.map(str::trim).filter(|n| !n.is_empty()) {
            return Some(name.to_string());
        }
        let state = self.state.lock().await;
        state
            .sessions
            .active()
            .filter(|s| !s.has_placeholder_title())
            .map(|s| s.title.clone())
    }

    pub fn notification_permission(&self) -> NotificationPermission {
        self.notifier.permission()
    }

    pub async fn request_notification_permission(&self) -> NotificationPermission {
        let permission = self.notifier.request_permission().await;
        info!("Notification permission is now {permission}");
        permission
    }

    /// Create a reminder, asking for notification permission first if needed
    pub async fn save_reminder(
        &self,
        plant: Option<&str>,
        frequency_days: u32,
        reminder_time: &str,
    ) -> Result<Reminder> {
        let Some(plant_name) = self.reminder_plant_for(plant).await else {
            bail!("Which plant is this reminder for? Add its name: /remind <days> <HH:mm> <plant>");
        };

        if self.notifier.permission() == NotificationPermission::Default
            && self.request_notification_permission().await != NotificationPermission::Granted
        {
            bail!(PERMISSION_REFUSED_MESSAGE);
        }
        if self.notifier.permission() != NotificationPermission::Granted {
            bail!(PERMISSION_NOT_GRANTED_MESSAGE);
        }

        let mut state = self.state.lock().await;
        let now = self.local_now();
        let mut at = now.with_timezone(&Utc);
        let id = loop {
            let id = format!("reminder_{}", at.timestamp_millis());
            if !state.reminders.iter().any(|r| r.id == id) {
                break id;
            }
            at += Duration::milliseconds(1);
        };

        let reminder = Reminder::new(id, plant_name, frequency_days, reminder_time, &now)?;
        info!(
            "Added reminder {} for {} every {} day(s) at {}",
            reminder.id, reminder.plant_name, reminder.frequency_days, reminder.reminder_time
        );
        state.reminders.push(reminder.clone());
        self.persist(&state);
        Ok(reminder)
    }

    pub async fn delete_reminder(&self, id: &str) -> bool {
        let mut state = self.state.lock().await;
        let before = state.reminders.len();
        state.reminders.retain(|r| r.id != id);
        let removed = state.reminders.len() != before;
        if removed {
            self.persist(&state);
        }
        removed
    }

    pub async fn reminders(&self) -> Vec<Reminder> {
        self.state.lock().await.reminders.clone()
    }

    /// Fire and reschedule due reminders in local time
    pub async fn check_reminders(&self) -> Vec<FiredReminder> {
        let mut state = self.state.lock().await;
        let fired = check_due(&mut state.reminders, self.clock.now(), &Local, self.notifier.as_ref());
        if !fired.is_empty() {
            self.persist(&state);
        }
        fired
    }

    // ---- calendar -------------------------------------------------------

    /// Care calendar for every known plant, generated once per process
    ///
    /// Errors carry the message to show the user; retrying is always allowed.
    pub async fn generate_calendar(&self) -> Result<Vec<CalendarTask>> {
        let prompt = {
            let state = self.state.lock().await;
            if let Some(tasks) = &state.calendar {
                return Ok(tasks.clone());
            }
            calendar_prompt(
                &state.weather,
                &state.sessions.plant_titles(),
                self.local_now().date_naive(),
            )?
        };

        let tasks = match self.generator.generate(&prompt, None).await {
            Ok(text) => parse_calendar(&text),
            Err(e) => Err(e),
        };
        let tasks = match tasks {
            Ok(tasks) => tasks,
            Err(e) => {
                error!("Failed to generate or parse calendar tasks: {e:#}");
                bail!(GENERATION_FAILED_MESSAGE);
            }
        };

        info!("Generated {} calendar task(s)", tasks.len());
        self.state.lock().await.calendar = Some(tasks.clone());
        Ok(tasks)
    }

    // ---- garden planner -------------------------------------------------

    /// Open (or reopen) the planner with an empty grid and the known plants
    pub async fn open_garden(&self) -> GardenPlanner {
        let mut state = self.state.lock().await;
        let planner = GardenPlanner::open(state.sessions.plant_titles());
        state.garden = Some(planner.clone());
        planner
    }

    /// Run `f` against the open planner and return its result with a snapshot
    pub async fn with_garden<R>(
        &self,
        f: impl FnOnce(&mut GardenPlanner) -> Result<R>,
    ) -> Result<(R, GardenPlanner)> {
        let mut state = self.state.lock().await;
        let planner = state
            .garden
            .as_mut()
            .ok_or_else(|| anyhow!("The garden planner is not open. Start with /garden open"))?;
        let result = f(&mut *planner)?;
        Ok((result, planner.clone()))
    }

    pub async fn garden(&self) -> Option<GardenPlanner> {
        self.state.lock().await.garden.clone()
    }

    /// Ask for layout advice on the current grid
    pub async fn garden_suggestions(&self) -> Result<String> {
        let prompt = {
            let mut state = self.state.lock().await;
            let planner = state
                .garden
                .as_mut()
                .ok_or_else(|| anyhow!("The garden planner is not open. Start with /garden open"))?;
            planner.suggestions = None;
            match planner.suggestion_prompt() {
                Some(prompt) => prompt,
                None => {
                    planner.suggestions = Some(EMPTY_GARDEN_MESSAGE.to_string());
                    return Ok(EMPTY_GARDEN_MESSAGE.to_string());
                }
            }
        };

        let advice = generate_or_fallback(self.generator.as_ref(), &prompt, None, SUGGESTIONS_FAILED_MESSAGE).await;

        if let Some(planner) = self.state.lock().await.garden.as_mut() {
            planner.suggestions = Some(advice.clone());
        }
        Ok(advice)
    }

    // ---- export ---------------------------------------------------------

    /// Write the active chat to `dir` and return the file path
    pub async fn export_active(&self, format: ExportFormat, dir: &Path) -> Result<PathBuf> {
        let session = self
            .active_session()
            .await
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow!("There is nothing to export yet"))?;

        let exported_at = self.local_now().format("%-m/%-d/%Y, %-I:%M:%S %p").to_string();
        let contents = match format {
            ExportFormat::Text => format_chat_text(&session, &exported_at),
            ExportFormat::Document => PaginatedDocument::build(&session, &exported_at).render(),
        };

        write_export(dir, &export_filename(&session.title, format.extension()), &contents).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ManualClock;
    use crate::features::generator::testing::ScriptedGenerator;
    use crate::features::reminders::notifier::testing::RecordingNotifier;
    use crate::features::reminders::reminder::{advance_due_date, first_due_date, parse_reminder_time};
    use crate::features::reminders::NOTIFICATION_TITLE;
    use crate::features::sessions::{MessageContent, Role, NEW_CHAT_TITLE};
    use crate::features::weather::{Coordinates, WeatherData};
    use crate::features::calendar::NO_PLANTS_MESSAGE;
    use crate::features::garden::CellPos;
    use chrono::TimeZone;

    const POTHOS: &str =
        r###"{"plantName":"Pothos","confidence":92,"careInstructions":"## Watering\nLet the top inch dry out."}"###;

    struct Harness {
        assistant: Assistant,
        generator: Arc<ScriptedGenerator>,
        notifier: Arc<RecordingNotifier>,
        clock: Arc<ManualClock>,
        database: Database,
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap()
    }

    fn harness_with(database: Database, notifier: RecordingNotifier) -> Harness {
        let generator = Arc::new(ScriptedGenerator::new());
        let notifier = Arc::new(notifier);
        let clock = Arc::new(ManualClock::new(t0()));
        let assistant = Assistant::load(
            generator.clone(),
            database.clone(),
            notifier.clone(),
            clock.clone(),
        );
        Harness {
            assistant,
            generator,
            notifier,
            clock,
            database,
        }
    }

    fn harness() -> Harness {
        harness_with(
            Database::in_memory().unwrap(),
            RecordingNotifier::new(NotificationPermission::Granted),
        )
    }

    fn image() -> ImagePart {
        ImagePart {
            mime_type: "image/png".into(),
            data: "iVBORw0KGgo=".into(),
        }
    }

    fn located() -> WeatherStatus {
        WeatherStatus {
            weather: Some(WeatherData {
                temperature: 18.4,
                weather_code: 61,
            }),
            coords: Some(Coordinates { lat: 40.7, lon: -74.0 }),
            location_error: None,
        }
    }

    #[tokio::test]
    async fn test_send_starts_titled_session() {
        let h = harness();
        h.generator.push_ok("Water weekly.");

        let reply = h
            .assistant
            .send_message("How often should I water a fiddle leaf fig tree?")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reply, ChatMessage::model_text("Water weekly."));

        let session = h.assistant.active_session().await.unwrap();
        assert_eq!(session.title, "How often should I water a fiddle l...");
        assert_eq!(session.messages.len(), 2);
        assert_eq!(session.messages[0].role, Role::User);
        assert_eq!(h.generator.calls()[0].0, "How often should I water a fiddle leaf fig tree?");
        assert!(!h.assistant.is_loading());
    }

    #[tokio::test]
    async fn test_send_failure_uses_fallback() {
        let h = harness();
        h.generator.push_err("503 Service Unavailable");

        let reply = h.assistant.send_message("Hi").await.unwrap().unwrap();
        assert_eq!(reply, ChatMessage::model_text(FALLBACK_MESSAGE));
        assert_eq!(h.assistant.active_session().await.unwrap().messages.len(), 2);
    }

    #[tokio::test]
    async fn test_blank_and_busy_sends_are_ignored() {
        let h = harness();
        assert!(h.assistant.send_message("   ").await.unwrap().is_none());

        let guard = h.assistant.begin_loading().unwrap();
        assert!(h.assistant.begin_loading().is_none());
        assert!(h.assistant.send_message("Hello").await.unwrap().is_none());
        assert!(h.assistant.identify(image()).await.unwrap().is_none());
        drop(guard);

        assert_eq!(h.generator.call_count(), 0);
        assert!(h.assistant.sessions().await.is_empty());
    }

    #[tokio::test]
    async fn test_weather_context_applies_once() {
        let h = harness();
        assert!(h.assistant.set_weather_context(true).await.is_err());

        h.assistant.set_weather(located()).await;
        h.assistant.set_weather_context(true).await.unwrap();
        h.generator.push_ok("Hold off on watering.");
        h.generator.push_ok("Sure.");

        h.assistant.send_message("Should I water today?").await.unwrap();
        assert!(!h.assistant.weather_context_enabled().await);
        h.assistant.send_message("Thanks").await.unwrap();

        let calls = h.generator.calls();
        assert_eq!(
            calls[0].0,
            "(My local weather is currently 18°C and Rain) Should I water today?"
        );
        assert_eq!(calls[1].0, "Thanks");

        let session = h.assistant.active_session().await.unwrap();
        assert_eq!(session.title, "Should I water today?");
        assert_eq!(
            session.messages[0].content,
            MessageContent::Text(calls[0].0.clone())
        );
    }

    #[tokio::test]
    async fn test_placeholder_is_replaced_not_duplicated() {
        let h = harness();
        h.generator.push_ok("one");
        h.generator.push_ok("two");

        h.assistant.new_chat().await;
        h.assistant.send_message("first").await.unwrap();
        assert_eq!(h.assistant.sessions().await.len(), 1);

        h.assistant.new_chat().await;
        h.clock.advance(Duration::seconds(1));
        h.assistant.send_message("second").await.unwrap();

        let store = h.assistant.sessions().await;
        assert_eq!(store.len(), 2);
        assert!(store.sessions().iter().all(|s| !s.is_empty()));
        assert_eq!(store.sessions()[0].title, "second");
        assert_eq!(store.active_id(), Some(store.sessions()[0].id.as_str()));
    }

    #[tokio::test]
    async fn test_identification_end_to_end() {
        let h = harness();
        h.generator.push_ok(POTHOS);

        let reply = h.assistant.identify(image()).await.unwrap().unwrap();
        let identification = reply.as_identification().unwrap();
        assert_eq!(identification.plant_name, "Pothos");
        assert_eq!(identification.confidence, 92);

        let session = h.assistant.active_session().await.unwrap();
        assert_eq!(session.title, "Pothos");
        assert_eq!(session.messages.len(), 2);
        match &session.messages[0].content {
            MessageContent::Image(attachment) => {
                assert_eq!(attachment.prompt_text, UPLOAD_CAPTION);
                assert_eq!(attachment.image_url, "data:image/png;base64,iVBORw0KGgo=");
            }
            other => panic!("expected image message, got {other:?}"),
        }

        let calls = h.generator.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, IDENTIFICATION_PROMPT);
        assert_eq!(calls[0].1, Some(image()));
    }

    #[tokio::test]
    async fn test_unparseable_identification_kept_as_text() {
        let h = harness();
        h.generator.push_ok("It looks like a pothos, but I can't be sure.");

        let reply = h.assistant.identify(image()).await.unwrap().unwrap();
        assert_eq!(reply, ChatMessage::model_text("It looks like a pothos, but I can't be sure."));
        assert_eq!(h.assistant.active_session().await.unwrap().title, PLANT_ANALYSIS_TITLE);

        h.generator.push_err("timeout");
        let reply = h.assistant.identify(image()).await.unwrap().unwrap();
        assert_eq!(reply, ChatMessage::model_text(FALLBACK_MESSAGE));
    }

    #[tokio::test]
    async fn test_upload_reads_images_only() {
        let h = harness();
        let dir = tempfile::tempdir().unwrap();
        let photo = dir.path().join("leaf.png");
        std::fs::write(&photo, [0x89, b'P', b'N', b'G']).unwrap();
        let notes = dir.path().join("notes.txt");
        std::fs::write(&notes, "not a picture").unwrap();

        assert!(h.assistant.upload_image(&notes).await.is_err());
        assert!(h.assistant.upload_image(&dir.path().join("missing.png")).await.is_err());
        assert!(h.assistant.sessions().await.is_empty());

        h.generator.push_ok(POTHOS);
        h.assistant.upload_image(&photo).await.unwrap().unwrap();
        let (_, sent) = &h.generator.calls()[0];
        assert_eq!(sent.as_ref().unwrap().mime_type, "image/png");
    }

    #[tokio::test]
    async fn test_edit_truncates_and_regenerates() {
        let h = harness();
        h.generator.push_ok("a1");
        h.generator.push_ok("a2");
        h.assistant.send_message("q1").await.unwrap();
        h.assistant.send_message("q2").await.unwrap();

        assert!(h.assistant.save_edit(1, "nope").await.is_err());
        assert!(h.assistant.save_edit(0, " ").await.is_err());

        h.generator.push_err("boom");
        let reply = h.assistant.save_edit(0, "q1 edited").await.unwrap().unwrap();
        assert_eq!(reply, ChatMessage::model_text(REGENERATE_FALLBACK_MESSAGE));

        let session = h.assistant.active_session().await.unwrap();
        assert_eq!(
            session.messages,
            vec![
                ChatMessage::user_text("q1 edited"),
                ChatMessage::model_text(REGENERATE_FALLBACK_MESSAGE)
            ]
        );
        assert_eq!(h.generator.calls().last().unwrap().0, "q1 edited");
    }

    #[tokio::test]
    async fn test_identification_feedback() {
        let h = harness();
        h.generator.push_ok(POTHOS);
        h.assistant.identify(image()).await.unwrap();

        assert!(h
            .assistant
            .identification_feedback(0, IdentificationFeedback::Correct, None)
            .await
            .is_err());

        let followup = h
            .assistant
            .identification_feedback(1, IdentificationFeedback::Incorrect, None)
            .await
            .unwrap();
        assert!(followup.is_none());

        let followup = h
            .assistant
            .identification_feedback(1, IdentificationFeedback::Incorrect, Some("Philodendron".into()))
            .await
            .unwrap()
            .unwrap();
        assert!(followup.contains("this is a Philodendron"));

        let session = h.assistant.active_session().await.unwrap();
        let identification = session.messages[1].as_identification().unwrap();
        assert_eq!(identification.user_feedback, Some(IdentificationFeedback::Incorrect));
        assert_eq!(identification.corrected_name.as_deref(), Some("Philodendron"));
        assert_eq!(session.messages.len(), 3);
    }

    #[tokio::test]
    async fn test_select_and_delete() {
        let h = harness();
        h.generator.push_ok("a");
        h.generator.push_ok("b");
        h.assistant.send_message("older").await.unwrap();
        h.clock.advance(Duration::seconds(1));
        h.assistant.new_chat().await;
        h.assistant.send_message("newer").await.unwrap();

        let selected = h.assistant.select_chat("2").await.unwrap();
        assert_eq!(selected.title, "older");
        assert!(h.assistant.select_chat("99").await.is_err());

        h.assistant.delete_chat("2").await.unwrap();
        let store = h.assistant.sessions().await;
        assert_eq!(store.len(), 1);
        assert_eq!(store.active().unwrap().title, "newer");

        h.assistant.delete_chat("1").await.unwrap();
        assert!(h.assistant.active_session().await.is_none());
    }

    #[tokio::test]
    async fn test_state_survives_reload() {
        let h = harness();
        h.generator.push_ok(POTHOS);
        h.assistant.identify(image()).await.unwrap();
        h.assistant.save_reminder(None, 7, "09:00").await.unwrap();

        let reloaded = harness_with(h.database.clone(), RecordingNotifier::new(NotificationPermission::Granted));
        assert_eq!(reloaded.assistant.sessions().await, h.assistant.sessions().await);
        assert_eq!(reloaded.assistant.reminders().await, h.assistant.reminders().await);
        assert_eq!(reloaded.assistant.active_session().await.unwrap().title, "Pothos");
    }

    #[tokio::test]
    async fn test_dangling_active_id_repaired_on_load() {
        let database = Database::in_memory().unwrap();
        let sessions = vec![ChatSession::new("chat_2", "Fern"), ChatSession::new("chat_1", "Rose")];
        database.set_json(HISTORY_KEY, &sessions).unwrap();
        database.set_json(ACTIVE_CHAT_KEY, "chat_gone").unwrap();
        database.set(REMINDERS_KEY, "not json").unwrap();

        let h = harness_with(database, RecordingNotifier::new(NotificationPermission::Granted));
        let store = h.assistant.sessions().await;
        assert_eq!(store.active_id(), Some("chat_2"));
        assert!(h.assistant.reminders().await.is_empty());
        assert_eq!(
            h.database.get("wateringReminders.unreadable").unwrap().as_deref(),
            Some("not json")
        );
    }

    #[tokio::test]
    async fn test_history_with_fractional_confidence_survives_reload() {
        let database = Database::in_memory().unwrap();
        let stored = r###"[
            {"id":"chat_2","title":"Pothos","messages":[
                {"role":"user","content":{"promptText":"Analyze this plant:","imageUrl":"data:image/png;base64,AA"}},
                {"role":"model","content":{"type":"plantIdentification","plantName":"Pothos","confidence":85.5,"careInstructions":"Weekly"}}
            ]},
            {"id":"chat_1","title":"Fern","messages":[
                {"role":"user","content":"Is my fern ok?"},
                {"role":"model","content":"Looks healthy."}
            ]}
        ]"###;
        database.set(HISTORY_KEY, stored).unwrap();
        database.set_json(ACTIVE_CHAT_KEY, "chat_1").unwrap();

        let h = harness_with(database, RecordingNotifier::new(NotificationPermission::Granted));
        let store = h.assistant.sessions().await;
        assert_eq!(store.len(), 2);
        let id = store.sessions()[0].messages[1].as_identification().unwrap();
        assert_eq!(id.confidence, 86);

        h.generator.push_ok("Mist it twice a week.");
        h.assistant.send_message("new question").await.unwrap();

        let saved: Vec<ChatSession> = h.database.get_json(HISTORY_KEY).unwrap().unwrap();
        let titles: Vec<&str> = saved.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Pothos", "Fern"]);
        assert_eq!(saved[1].messages.len(), 4);
        assert_eq!(h.database.get("chatHistory.unreadable").unwrap(), None);
    }

    #[tokio::test]
    async fn test_unreadable_session_is_skipped_and_backed_up() {
        let database = Database::in_memory().unwrap();
        let stored = r###"[
            {"id":"chat_2","title":"Broken","messages":[{"role":"gardener","content":"?"}]},
            {"id":"chat_1","title":"Fern","messages":[{"role":"user","content":"Is my fern ok?"}]}
        ]"###;
        database.set(HISTORY_KEY, stored).unwrap();

        let h = harness_with(database, RecordingNotifier::new(NotificationPermission::Granted));
        let store = h.assistant.sessions().await;
        assert_eq!(store.len(), 1);
        assert_eq!(store.sessions()[0].title, "Fern");
        assert_eq!(h.database.get("chatHistory.unreadable").unwrap().as_deref(), Some(stored));

        h.generator.push_ok("Looks healthy.");
        h.assistant.send_message("Thanks").await.unwrap();

        let saved: Vec<ChatSession> = h.database.get_json(HISTORY_KEY).unwrap().unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].title, "Fern");
        assert_eq!(h.database.get("chatHistory.unreadable").unwrap().as_deref(), Some(stored));
    }

    #[tokio::test]
    async fn test_reminder_plant_context() {
        let h = harness();
        assert_eq!(h.assistant.reminder_plant_for(Some(" Fern ")).await.as_deref(), Some("Fern"));
        assert_eq!(h.assistant.reminder_plant_for(None).await, None);

        h.assistant.new_chat().await;
        assert_eq!(h.assistant.reminder_plant_for(None).await, None);
        assert!(h.assistant.save_reminder(None, 3, "09:00").await.is_err());

        h.generator.push_ok(POTHOS);
        h.assistant.identify(image()).await.unwrap();
        assert_eq!(h.assistant.reminder_plant_for(None).await.as_deref(), Some("Pothos"));
    }

    #[tokio::test]
    async fn test_save_reminder_requests_permission() {
        let h = harness_with(Database::in_memory().unwrap(), RecordingNotifier::new(NotificationPermission::Default));
        let reminder = h.assistant.save_reminder(Some("Fern"), 3, "09:00").await.unwrap();
        assert_eq!(h.assistant.notification_permission(), NotificationPermission::Granted);

        let now = h.clock.now().with_timezone(&Local);
        let expected = first_due_date(&now, parse_reminder_time("09:00").unwrap()).unwrap();
        assert_eq!(reminder.next_due_date, expected.timestamp_millis());
        assert!(reminder.next_due_date > h.clock.now().timestamp_millis());
        assert!(reminder.id.starts_with("reminder_"));

        let second = h.assistant.save_reminder(Some("Rose"), 1, "18:30").await.unwrap();
        assert_ne!(second.id, reminder.id);
    }

    #[tokio::test]
    async fn test_save_reminder_refused_without_permission() {
        let h = harness_with(Database::in_memory().unwrap(), RecordingNotifier::refusing());
        let err = h.assistant.save_reminder(Some("Fern"), 3, "09:00").await.unwrap_err();
        assert_eq!(err.to_string(), PERMISSION_REFUSED_MESSAGE);

        let err = h.assistant.save_reminder(Some("Fern"), 3, "09:00").await.unwrap_err();
        assert_eq!(err.to_string(), PERMISSION_NOT_GRANTED_MESSAGE);
        assert!(h.assistant.reminders().await.is_empty());
    }

    #[tokio::test]
    async fn test_check_reminders_fires_and_persists() {
        let h = harness();
        let reminder = h.assistant.save_reminder(Some("Fern"), 2, "09:00").await.unwrap();
        assert!(h.assistant.check_reminders().await.is_empty());

        h.clock.set(DateTime::<Utc>::from_timestamp_millis(reminder.next_due_date).unwrap());
        let fired = h.assistant.check_reminders().await;
        assert_eq!(fired.len(), 1);
        assert!(fired[0].notified);
        assert_eq!(
            h.notifier.shown(),
            vec![(NOTIFICATION_TITLE.to_string(), "It's time to water your Fern.".to_string())]
        );

        let expected = advance_due_date(reminder.next_due_date, 2, &Local);
        let stored: Vec<Reminder> = h.database.get_json(REMINDERS_KEY).unwrap().unwrap();
        assert_eq!(stored[0].next_due_date, expected);

        assert!(h.assistant.delete_reminder(&reminder.id).await);
        assert!(!h.assistant.delete_reminder(&reminder.id).await);
    }

    #[tokio::test]
    async fn test_calendar_needs_location_and_plants() {
        let h = harness();
        let err = h.assistant.generate_calendar().await.unwrap_err();
        assert!(err.to_string().starts_with("Location access is required"));

        h.assistant.set_weather(located()).await;
        let err = h.assistant.generate_calendar().await.unwrap_err();
        assert_eq!(err.to_string(), NO_PLANTS_MESSAGE);
        assert_eq!(h.generator.call_count(), 0);
    }

    #[tokio::test]
    async fn test_calendar_generated_once_and_retryable() {
        let h = harness();
        h.assistant.set_weather(located()).await;
        h.generator.push_ok(POTHOS);
        h.assistant.identify(image()).await.unwrap();

        h.generator.push_ok("Here is your calendar!");
        let err = h.assistant.generate_calendar().await.unwrap_err();
        assert_eq!(err.to_string(), GENERATION_FAILED_MESSAGE);

        h.generator
            .push_ok(r#"[{"plant":"Pothos","task":"Trim leggy vines","timing":"Mid-month"}]"#);
        let tasks = h.assistant.generate_calendar().await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert!(h.generator.calls()[2].0.contains("My plants: Pothos"));

        let cached = h.assistant.generate_calendar().await.unwrap();
        assert_eq!(cached, tasks);
        assert_eq!(h.generator.call_count(), 3);
    }

    #[tokio::test]
    async fn test_garden_flow() {
        let h = harness();
        assert!(h.assistant.garden_suggestions().await.is_err());

        h.generator.push_ok(POTHOS);
        h.assistant.identify(image()).await.unwrap();
        let planner = h.assistant.open_garden().await;
        assert_eq!(planner.palette(), ["Pothos".to_string()]);

        let advice = h.assistant.garden_suggestions().await.unwrap();
        assert_eq!(advice, EMPTY_GARDEN_MESSAGE);
        assert_eq!(h.generator.call_count(), 1);

        let cell = CellPos::new(0, 0).unwrap();
        h.assistant
            .with_garden(|planner| planner.place("Pothos", cell))
            .await
            .unwrap();

        h.generator.push_err("quota");
        let advice = h.assistant.garden_suggestions().await.unwrap();
        assert_eq!(advice, SUGGESTIONS_FAILED_MESSAGE);

        h.generator.push_ok("## Nice layout");
        let advice = h.assistant.garden_suggestions().await.unwrap();
        assert_eq!(advice, "## Nice layout");
        assert!(h.generator.calls()[2].0.contains("My current plant list: Pothos"));
        assert_eq!(h.assistant.garden().await.unwrap().suggestions.as_deref(), Some("## Nice layout"));

        // reopening starts from an empty grid
        let planner = h.assistant.open_garden().await;
        assert!(planner.grid.is_empty());
    }

    #[tokio::test]
    async fn test_export_active_chat() {
        let h = harness();
        let dir = tempfile::tempdir().unwrap();
        assert!(h.assistant.export_active(ExportFormat::Text, dir.path()).await.is_err());

        h.generator.push_ok(POTHOS);
        h.assistant.identify(image()).await.unwrap();

        let path = h.assistant.export_active(ExportFormat::Text, dir.path()).await.unwrap();
        assert_eq!(path.file_name().unwrap(), "chat_pothos.txt");
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Chat Title: Pothos\nExported on: "));
        assert!(text.contains("You:\nAnalyze this plant:\n(Image Attached)\n\n"));
        assert!(text.contains("[Identified Pothos with 92% confidence]\n## Watering"));

        let path = h.assistant.export_active(ExportFormat::Document, dir.path()).await.unwrap();
        assert_eq!(path.file_name().unwrap(), "chat_pothos.doc.txt");
        let doc = std::fs::read_to_string(&path).unwrap();
        assert!(doc.contains("Page 1 of 1"));
        assert!(!doc.contains("## Watering"));
    }

    #[tokio::test]
    async fn test_new_chat_is_placeholder() {
        let h = harness();
        let id = h.assistant.new_chat().await;
        let session = h.assistant.active_session().await.unwrap();
        assert_eq!(session.id, id);
        assert_eq!(session.title, NEW_CHAT_TITLE);
        assert!(session.is_empty());
    }
}
