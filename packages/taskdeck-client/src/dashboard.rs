//! Dashboard state: one panel per task plus the search box.
//!
//! Panel state lives inside the panel it belongs to, so deleting a task
//! takes its subtasks, suggestions and inline error with it, and a refetch
//! of the task list cannot orphan per-task state.

use uuid::Uuid;

use crate::api::{SearchHit, Subtask, Task};

#[derive(Debug)]
pub struct TaskPanel {
	pub task: Task,
	pub subtasks: Vec<Subtask>,
	pub suggestions: Vec<String>,
	pub suggesting: bool,
	pub collapsed: bool,
	pub error: Option<String>,
}
impl TaskPanel {
	fn new(task: Task) -> Self {
		Self {
			task,
			subtasks: Vec::new(),
			suggestions: Vec::new(),
			suggesting: false,
			collapsed: true,
			error: None,
		}
	}

	pub fn toggle_collapsed(&mut self) {
		self.collapsed = !self.collapsed;
	}

	pub fn suggesting_started(&mut self) {
		self.suggesting = true;
		self.error = None;
	}

	pub fn suggestions_arrived(&mut self, suggestions: Vec<String>) {
		self.suggesting = false;
		self.suggestions = suggestions;
	}

	pub fn suggesting_failed(&mut self, message: String) {
		self.suggesting = false;
		self.error = Some(message);
	}

	/// Removes exactly the accepted string. Duplicated suggestions drop one
	/// occurrence per acceptance.
	pub fn suggestion_accepted(&mut self, title: &str, saved: Subtask) {
		if let Some(position) = self.suggestions.iter().position(|s| s == title) {
			self.suggestions.remove(position);
		}

		self.subtasks.push(saved);
	}

	pub fn suggestion_dismissed(&mut self, title: &str) {
		if let Some(position) = self.suggestions.iter().position(|s| s == title) {
			self.suggestions.remove(position);
		}
	}
}

/// What the search box wants done with a submitted query.
#[derive(Debug, PartialEq, Eq)]
pub enum SearchAction {
	/// Blank input: results were cleared locally, nothing to send.
	Cleared,
	/// Run this (trimmed) query against the backend.
	Run(String),
}

#[derive(Debug, Default)]
pub struct SearchBox {
	pub query: String,
	pub results: Vec<SearchHit>,
	pub searching: bool,
	pub error: Option<String>,
}
impl SearchBox {
	/// Blank queries never reach the backend.
	pub fn submit(&mut self) -> SearchAction {
		let trimmed = self.query.trim().to_string();

		if trimmed.is_empty() {
			self.results.clear();
			self.error = None;

			return SearchAction::Cleared;
		}

		self.searching = true;
		self.error = None;

		SearchAction::Run(trimmed)
	}

	/// A new search replaces prior results wholesale.
	pub fn results_arrived(&mut self, results: Vec<SearchHit>) {
		self.searching = false;
		self.results = results;
	}

	pub fn search_failed(&mut self, message: String) {
		self.searching = false;
		self.error = Some(message);
	}

	pub fn clear(&mut self) {
		self.query.clear();
		self.results.clear();
		self.searching = false;
		self.error = None;
	}
}

#[derive(Debug, Default)]
pub struct DashboardModel {
	pub panels: Vec<TaskPanel>,
	pub search: SearchBox,
	pub busy: bool,
	pub error: Option<String>,
}
impl DashboardModel {
	pub fn new() -> Self {
		Self::default()
	}

	/// Applies a fresh task list. Panels for tasks that survived keep their
	/// subtasks, suggestions and flags; panels for vanished tasks die here.
	pub fn tasks_arrived(&mut self, tasks: Vec<Task>) {
		let mut old = std::mem::take(&mut self.panels);

		self.busy = false;
		self.panels = tasks
			.into_iter()
			.map(|task| {
				match old.iter().position(|panel| panel.task.id == task.id) {
					Some(position) => {
						let mut panel = old.swap_remove(position);

						panel.task = task;

						panel
					},
					None => TaskPanel::new(task),
				}
			})
			.collect();
	}

	pub fn panel_mut(&mut self, task_id: Uuid) -> Option<&mut TaskPanel> {
		self.panels.iter_mut().find(|panel| panel.task.id == task_id)
	}

	pub fn task_created(&mut self, task: Task) {
		// Matches the list endpoint's newest-first ordering.
		self.panels.insert(0, TaskPanel::new(task));
	}

	pub fn task_deleted(&mut self, task_id: Uuid) {
		self.panels.retain(|panel| panel.task.id != task_id);
	}

	pub fn loading(&mut self) {
		self.busy = true;
		self.error = None;
	}

	pub fn load_failed(&mut self, message: String) {
		self.busy = false;
		self.error = Some(message);
	}
}
