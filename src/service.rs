//! Background services gated by leader election.
//!
//! Several contexts (processes, tabs, workers) may share one persisted session while only one
//! of them should run duties such as token renewal. A [`ServiceManager`] owns a set of named
//! service factories; [`ServiceManager::start`] creates and starts every service whose
//! preconditions hold, holding back leadership-bound services until the [`LeaderElector`]
//! reports this context as leader. Call [`ServiceManager::on_leader`] when leadership is
//! granted later.

// std
use std::{
	mem,
	sync::atomic::{AtomicBool, Ordering},
};
// self
use crate::_prelude::*;

/// Cross-context leader election.
pub trait LeaderElector
where
	Self: Send + Sync,
{
	/// Returns `true` when this context currently holds leadership.
	fn is_leader(&self) -> bool;

	/// Returns `true` when some context holds leadership.
	fn has_leader(&self) -> bool;
}

/// A duty run in the background once the manager starts.
pub trait BackgroundService
where
	Self: Send + Sync,
{
	/// Preconditions other than leadership, e.g. a feature toggle.
	fn can_start(&self) -> bool;

	/// Returns `true` when only the leader may run this service.
	fn requires_leadership(&self) -> bool;

	/// Returns `true` once [`BackgroundService::start`] ran and [`BackgroundService::stop`]
	/// did not.
	fn is_started(&self) -> bool;

	/// Starts the duty.
	fn start(&self);

	/// Stops the duty.
	fn stop(&self);
}

/// Creates a fresh service instance, or `None` when the service is not available here.
pub type ServiceFactory = Arc<dyn Fn() -> Option<Arc<dyn BackgroundService>> + Send + Sync>;

#[derive(Default)]
struct ManagerState {
	started: bool,
	services: BTreeMap<String, Arc<dyn BackgroundService>>,
}

/// Starts, stops, and looks up named background services.
#[derive(Clone)]
pub struct ServiceManager {
	elector: Arc<dyn LeaderElector>,
	factories: Vec<(String, ServiceFactory)>,
	state: Arc<Mutex<ManagerState>>,
}
impl ServiceManager {
	/// Creates a manager with no registered services.
	pub fn new(elector: Arc<dyn LeaderElector>) -> Self {
		Self { elector, factories: Vec::new(), state: Default::default() }
	}

	/// Registers a named service factory, replacing any factory with the same name.
	pub fn register<F>(mut self, name: impl Into<String>, factory: F) -> Self
	where
		F: 'static + Fn() -> Option<Arc<dyn BackgroundService>> + Send + Sync,
	{
		let name = name.into();

		self.factories.retain(|(existing, _)| existing != &name);
		self.factories.push((name, Arc::new(factory)));

		self
	}

	/// Returns `true` when this context holds leadership.
	pub fn is_leader(&self) -> bool {
		self.elector.is_leader()
	}

	/// Returns `true` when some context holds leadership.
	pub fn has_leader(&self) -> bool {
		self.elector.has_leader()
	}

	/// Returns `true` between [`ServiceManager::start`] and [`ServiceManager::stop`].
	pub fn is_started(&self) -> bool {
		self.state.lock().started
	}

	/// Starts every eligible service. A running manager is stopped first.
	///
	/// Services are started and stopped outside the manager's lock, so they may call back
	/// into the manager.
	pub fn start(&self) {
		let previous = {
			let mut state = self.state.lock();

			state.started = true;

			mem::take(&mut state.services)
		};

		stop_all(previous);
		self.start_eligible();
	}

	/// Stops and forgets every running service.
	pub fn stop(&self) {
		let previous = {
			let mut state = self.state.lock();

			state.started = false;

			mem::take(&mut state.services)
		};

		stop_all(previous);
	}

	/// Leadership was granted: starts the services held back while this context was a
	/// follower. Does nothing before [`ServiceManager::start`].
	pub fn on_leader(&self) {
		self.start_eligible();
	}

	/// Running service registered under `name`.
	pub fn service(&self, name: &str) -> Option<Arc<dyn BackgroundService>> {
		self.state.lock().services.get(name).cloned()
	}

	fn start_eligible(&self) {
		let leader = self.elector.is_leader();
		let eligible = {
			let mut state = self.state.lock();

			if !state.started {
				return;
			}

			let mut eligible = Vec::new();

			for (name, factory) in &self.factories {
				if state.services.contains_key(name) {
					continue;
				}

				let Some(service) = factory() else { continue };

				if service.can_start()
					&& !service.is_started()
					&& (!service.requires_leadership() || leader)
				{
					state.services.insert(name.clone(), service.clone());
					eligible.push(service);
				}
			}

			eligible
		};

		for service in eligible {
			service.start();
		}
	}
}
impl Debug for ServiceManager {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let state = self.state.lock();

		f.debug_struct("ServiceManager")
			.field("factories", &self.factories.iter().map(|(name, _)| name).collect::<Vec<_>>())
			.field("started", &state.started)
			.field("running", &state.services.keys().collect::<Vec<_>>())
			.finish()
	}
}

fn stop_all(services: BTreeMap<String, Arc<dyn BackgroundService>>) {
	for service in services.into_values() {
		service.stop();
	}
}

/// Elector for a single context, with leadership toggled by the caller.
#[derive(Debug, Default)]
pub struct LocalElector {
	leader: AtomicBool,
}
impl LocalElector {
	/// Creates an elector that already holds leadership.
	pub fn leader() -> Self {
		Self { leader: AtomicBool::new(true) }
	}

	/// Creates an elector waiting for leadership.
	pub fn follower() -> Self {
		Self::default()
	}

	/// Grants leadership to this context.
	pub fn promote(&self) {
		self.leader.store(true, Ordering::Release);
	}

	/// Revokes leadership from this context.
	pub fn demote(&self) {
		self.leader.store(false, Ordering::Release);
	}
}
impl LeaderElector for LocalElector {
	fn is_leader(&self) -> bool {
		self.leader.load(Ordering::Acquire)
	}

	fn has_leader(&self) -> bool {
		self.is_leader()
	}
}
