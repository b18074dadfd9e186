//! Interactive console over the taskdeck client layer. Every command maps
//! onto one API call; view-model state (panels, search box, session flow)
//! lives between commands exactly as it would in a graphical frontend.

use std::io::{self, BufRead, Write};

use clap::Parser;
use uuid::Uuid;

use taskdeck_client::{
	ApiClient,
	dashboard::{DashboardModel, SearchAction},
	session::{SessionFlow, SessionModel},
};
use taskdeck_domain::task::{Priority, Status};

#[derive(Debug, Parser)]
#[command(version, rename_all = "kebab")]
pub struct Args {
	/// Base URL of the taskdeck API.
	#[arg(long, default_value = "http://127.0.0.1:8080")]
	pub api_base: String,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let mut client = ApiClient::new(args.api_base);
	let mut session = SessionModel::new();
	let mut dashboard = DashboardModel::new();
	let stdin = io::stdin();
	let mut lines = stdin.lock().lines();

	println!("taskdeck console. Type `help` for commands.");

	loop {
		print!("> ");
		io::stdout().flush()?;

		let Some(line) = lines.next() else {
			break;
		};
		let line = line?.trim().to_string();
		let mut words = line.split_whitespace();
		let Some(command) = words.next() else {
			continue;
		};
		let rest = line[command.len()..].trim().to_string();

		match command {
			"help" => print_help(),
			"quit" | "exit" => break,
			"signup" | "login" => {
				let mut parts = rest.split_whitespace();
				let (Some(email), Some(password)) = (parts.next(), parts.next()) else {
					println!("Usage: {command} <email> <password>");

					continue;
				};

				session.submitting();

				let result = if command == "signup" {
					client.sign_up(email, password).await
				} else {
					client.sign_in(email, password).await
				};

				match result {
					Ok(auth) => match client.fetch_profile().await {
						Ok(profile) => {
							session.signed_in(&auth, &profile);

							match &session.flow {
								SessionFlow::NamePrompt { .. } => {
									println!(
										"Welcome! Set your display name with `name <your name>`.",
									);
								},
								SessionFlow::Ready { name, .. } => {
									println!("Welcome back, {name}.");
								},
								SessionFlow::SignedOut => {},
							}
						},
						Err(err) => session.failed(err.user_message()),
					},
					Err(err) => session.failed(err.user_message()),
				}

				if let Some(error) = &session.error {
					println!("{error}");
				}
			},
			"logout" => {
				if let Err(err) = client.sign_out().await {
					println!("{}", err.user_message());
				}

				session.signed_out();
				dashboard = DashboardModel::new();
				println!("Signed out.");
			},
			"name" => {
				if rest.is_empty() {
					println!("Usage: name <display name>");

					continue;
				}

				match client.update_name(&rest).await {
					Ok(profile) => {
						session.name_confirmed(&profile.name);
						println!("Hello, {}.", profile.name);
					},
					Err(err) => println!("{}", err.user_message()),
				}
			},
			"list" => {
				dashboard.loading();

				match client.list_tasks().await {
					Ok(tasks) => {
						dashboard.tasks_arrived(tasks);
						print_panels(&dashboard);
					},
					Err(err) => {
						dashboard.load_failed(err.user_message());
						println!("{}", dashboard.error.as_deref().unwrap_or_default());
					},
				}
			},
			"add" => {
				let (priority, title) = split_priority(&rest);

				if title.is_empty() {
					println!("Usage: add [low|medium|high] <title>");

					continue;
				}

				match client.create_task(title, priority).await {
					Ok(task) => {
						println!("Created {} ({}).", task.title, task.id);
						dashboard.task_created(task);
					},
					Err(err) => println!("{}", err.user_message()),
				}
			},
			"status" => {
				let mut parts = rest.split_whitespace();
				let (Some(id), Some(status)) = (parts.next(), parts.next()) else {
					println!("Usage: status <task-id> <pending|in-progress|done>");

					continue;
				};
				let (Ok(task_id), Ok(status)) = (id.parse::<Uuid>(), status.parse::<Status>())
				else {
					println!("Usage: status <task-id> <pending|in-progress|done>");

					continue;
				};

				match client.update_status(task_id, status).await {
					Ok(task) => println!("{} is now {}.", task.title, task.status.as_str()),
					Err(err) => println!("{}", err.user_message()),
				}
			},
			"priority" => {
				let mut parts = rest.split_whitespace();
				let (Some(id), Some(priority)) = (parts.next(), parts.next()) else {
					println!("Usage: priority <task-id> <low|medium|high>");

					continue;
				};
				let (Ok(task_id), Ok(priority)) =
					(id.parse::<Uuid>(), priority.parse::<Priority>())
				else {
					println!("Usage: priority <task-id> <low|medium|high>");

					continue;
				};

				match client.update_priority(task_id, priority).await {
					Ok(task) => println!("{} is now {}.", task.title, task.priority.as_str()),
					Err(err) => println!("{}", err.user_message()),
				}
			},
			"del" => {
				let Ok(task_id) = rest.parse::<Uuid>() else {
					println!("Usage: del <task-id>");

					continue;
				};

				match client.delete_task(task_id).await {
					Ok(()) => {
						dashboard.task_deleted(task_id);
						println!("Deleted.");
					},
					Err(err) => println!("{}", err.user_message()),
				}
			},
			"subs" => {
				let Ok(task_id) = rest.parse::<Uuid>() else {
					println!("Usage: subs <task-id>");

					continue;
				};

				match client.list_subtasks(task_id).await {
					Ok(subtasks) => {
						if let Some(panel) = dashboard.panel_mut(task_id) {
							panel.subtasks = subtasks.clone();
						}
						for subtask in &subtasks {
							println!("  {} {}", subtask.id, subtask.title);
						}
						if subtasks.is_empty() {
							println!("  (no subtasks)");
						}
					},
					Err(err) => println!("{}", err.user_message()),
				}
			},
			"addsub" => {
				let mut parts = rest.splitn(2, ' ');
				let (Some(id), Some(title)) = (parts.next(), parts.next()) else {
					println!("Usage: addsub <task-id> <title>");

					continue;
				};
				let Ok(task_id) = id.parse::<Uuid>() else {
					println!("Usage: addsub <task-id> <title>");

					continue;
				};

				match client.create_subtask(task_id, title.trim()).await {
					Ok(subtask) => {
						let accepted_title = subtask.title.clone();

						if let Some(panel) = dashboard.panel_mut(task_id) {
							panel.suggestion_accepted(&accepted_title, subtask);
						}

						println!("Added subtask {accepted_title}.");
					},
					Err(err) => println!("{}", err.user_message()),
				}
			},
			"suggest" => {
				let Ok(task_id) = rest.parse::<Uuid>() else {
					println!("Usage: suggest <task-id>");

					continue;
				};

				if let Some(panel) = dashboard.panel_mut(task_id) {
					panel.suggesting_started();
				}

				match client.suggest_subtasks(task_id).await {
					Ok(suggestions) => {
						for suggestion in &suggestions {
							println!("  - {suggestion}");
						}
						if suggestions.is_empty() {
							println!("  (no suggestions)");
						}
						if let Some(panel) = dashboard.panel_mut(task_id) {
							panel.suggestions_arrived(suggestions);
						}
					},
					Err(err) => {
						let message = err.user_message();

						if let Some(panel) = dashboard.panel_mut(task_id) {
							panel.suggesting_failed(message.clone());
						}

						println!("{message}");
					},
				}
			},
			"search" => {
				dashboard.search.query = rest;

				match dashboard.search.submit() {
					SearchAction::Cleared => println!("Search cleared."),
					SearchAction::Run(query) => match client.smart_search(&query).await {
						Ok(hits) => {
							for hit in &hits {
								println!(
									"  {:.2}  {}  [{}]",
									hit.similarity,
									hit.task.title,
									hit.task.status.as_str(),
								);
							}
							if hits.is_empty() {
								println!("  (no matches)");
							}

							dashboard.search.results_arrived(hits);
						},
						Err(err) => {
							let message = err.user_message();

							dashboard.search.search_failed(message.clone());
							println!("{message}");
						},
					},
				}
			},
			"profile" => match client.fetch_profile().await {
				Ok(profile) => {
					println!("{} <{}>", profile.name, profile.email);

					match &profile.profile_picture_url {
						Some(url) => println!("picture: {url}"),
						None => println!("picture: (none)"),
					}
				},
				Err(err) => println!("{}", err.user_message()),
			},
			"upload" => {
				if rest.is_empty() {
					println!("Usage: upload <path-to-image>");

					continue;
				}

				match std::fs::read(&rest) {
					Ok(bytes) => {
						let filename = rest.rsplit('/').next().unwrap_or(&rest).to_string();
						let content_type = guess_content_type(&filename);

						match client.upload_picture(&filename, content_type, bytes).await {
							Ok(url) => println!("Uploaded: {url}"),
							Err(err) => println!("{}", err.user_message()),
						}
					},
					Err(err) => println!("Could not read {rest}: {err}."),
				}
			},
			other => println!("Unknown command `{other}`. Type `help` for commands."),
		}
	}

	Ok(())
}

fn print_help() {
	println!(
		"\
Commands:
  signup <email> <password>     create an account and sign in
  login <email> <password>      sign in
  logout                        sign out
  name <display name>           set your display name
  list                          list your tasks
  add [priority] <title>        create a task (default priority: medium)
  status <task-id> <status>     set pending | in-progress | done
  priority <task-id> <level>    set low | medium | high
  del <task-id>                 delete a task and its subtasks
  subs <task-id>                list subtasks
  addsub <task-id> <title>      add a subtask
  suggest <task-id>             AI-suggested subtasks
  search <query>                semantic search (blank clears)
  profile                       show your profile
  upload <path>                 upload a profile picture
  quit"
	);
}

fn print_panels(dashboard: &DashboardModel) {
	if dashboard.panels.is_empty() {
		println!("(no tasks yet)");

		return;
	}

	for panel in &dashboard.panels {
		println!(
			"{}  [{:11}] [{:6}] {}",
			panel.task.id,
			panel.task.status.as_str(),
			panel.task.priority.as_str(),
			panel.task.title,
		);
	}
}

fn split_priority(rest: &str) -> (Priority, &str) {
	let mut parts = rest.splitn(2, ' ');

	match (parts.next(), parts.next()) {
		(Some(first), Some(remainder)) =>
			match first.parse::<Priority>() {
				Ok(priority) => (priority, remainder.trim()),
				Err(_) => (Priority::Medium, rest),
			},
		_ => (Priority::Medium, rest),
	}
}

fn guess_content_type(filename: &str) -> &'static str {
	match filename.rsplit('.').next().map(str::to_ascii_lowercase).as_deref() {
		Some("png") => "image/png",
		Some("jpg") | Some("jpeg") => "image/jpeg",
		Some("gif") => "image/gif",
		Some("webp") => "image/webp",
		_ => "application/octet-stream",
	}
}
