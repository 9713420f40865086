use crate::bridge::{self, HostBridge};
use crate::config::AppConfig;
use crate::create::CreateForm;
use crate::model::Fid;
use crate::store::PollStore;
use crate::vote::PollView;

/// Where the page address points the app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Create,
    Vote(String),
}

impl Route {
    /// Parses the page query string; a leading `?` is tolerated. A `poll`
    /// parameter routes straight to voting, anything else to creation.
    ///
    /// The id is taken verbatim: poll ids are dashless uuids, ASCII
    /// alphanumeric by construction, so they never carry percent-escapes.
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        for pair in query.split('&') {
            if let Some(id) = pair.strip_prefix("poll=") {
                if !id.is_empty() {
                    return Route::Vote(id.to_string());
                }
            }
        }
        Route::Create
    }

    /// The query string the address bar should show for this route.
    pub fn to_query(&self) -> String {
        match self {
            Route::Create => String::new(),
            Route::Vote(id) => format!("?poll={id}"),
        }
    }
}

/// What the shell resolved during startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Session {
    pub viewer: Option<Fid>,
    pub host_available: bool,
}

/// The single active view; exactly one at a time, no stacking.
#[derive(Debug, Clone)]
pub enum View {
    Loading,
    Create(CreateForm),
    Vote(PollView),
}

/// Top-level orchestration: startup sequencing against the host bridge, then
/// routing between the creation and voting views. Navigation returns the
/// query string the embedder should push to the address bar.
pub struct AppShell {
    pub config: AppConfig,
    pub store: PollStore,
    session: Session,
    view: View,
}

impl AppShell {
    pub fn new(config: AppConfig, store: PollStore) -> Self {
        AppShell {
            config,
            store,
            session: Session::default(),
            view: View::Loading,
        }
    }

    /// Runs the startup sequence and enters the view the initial route names.
    ///
    /// The install request is fired first, best-effort. Identity resolution
    /// and the ready signal then run concurrently: ready must go out whether
    /// or not a viewer identity ever materializes.
    pub async fn start(&mut self, bridge: &impl HostBridge, initial: Route) {
        bridge::request_install(bridge);

        let (viewer, ()) = futures::join!(
            bridge::resolve_identity(
                bridge,
                self.config.sdk_poll_interval,
                self.config.sdk_timeout,
            ),
            bridge::signal_ready(bridge, self.config.ready_retry_delay),
        );

        self.session = Session {
            viewer,
            host_available: bridge.is_available(),
        };
        match viewer {
            Some(fid) => info!("startup complete, viewer fid {fid}"),
            None => info!("startup complete in guest mode"),
        }

        self.view = match initial {
            Route::Create => View::Create(CreateForm::new()),
            Route::Vote(id) => View::Vote(PollView::load(&self.store, &id, viewer)),
        };
    }

    pub fn session(&self) -> Session {
        self.session
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut View {
        &mut self.view
    }

    /// Swaps to the voting view for `poll_id` and returns the query string to
    /// push, without a reload.
    pub fn open_poll(&mut self, poll_id: &str) -> String {
        self.view = View::Vote(PollView::load(&self.store, poll_id, self.session.viewer));
        Route::Vote(poll_id.to_string()).to_query()
    }

    /// Returns to the creation view with a fresh form.
    pub fn back(&mut self) -> String {
        self.view = View::Create(CreateForm::new());
        Route::Create.to_query()
    }
}
