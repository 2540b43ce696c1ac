use crate::auth::{self, AuthError};
use crate::model::{Task, TaskDraft, TaskPatch, TaskStore};
use crate::storage::{FileStore, KvStore, StoreScope};
use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use std::io::{self, BufRead, Write};

pub fn signup(username: String, password: String, confirm: String) -> Result<()> {
    let mut store = FileStore::open_current()?;
    auth::register(&mut store, &username, &password, &confirm)
        .with_context(|| format!("signing up {}", username))?;
    println!("Sign up successful. Please log in.");
    Ok(())
}

pub fn login(username: String, password: String) -> Result<()> {
    let mut store = FileStore::open_current()?;
    if !auth::authenticate(&store, &username, &password)? {
        return Err(AuthError::BadCredentials.into());
    }
    auth::login(&mut store, &username)?;
    println!("Logged in as {}", username);
    Ok(())
}

pub fn logout() -> Result<()> {
    let mut store = FileStore::open_current()?;
    auth::logout(&mut store)?;
    println!("Logged out");
    Ok(())
}

pub fn whoami() -> Result<()> {
    let store = FileStore::open_current()?;
    match auth::current_user(&store) {
        Some(user) => println!(
            "{} ({})",
            user,
            match store.scope {
                StoreScope::Project => "project",
                StoreScope::Global => "global",
            }
        ),
        None => println!("Not logged in"),
    }
    Ok(())
}

/// Interactive task session. Tasks live only in memory here; everything is
/// discarded when the loop ends.
pub fn shell() -> Result<()> {
    let mut store = FileStore::open_current()?;
    let user = auth::current_user(&store)
        .ok_or_else(|| anyhow!("not logged in (try 'taskdesk login')"))?;
    println!("Welcome back, {}. Type 'help' for commands.", user);

    let mut tasks = TaskStore::new();
    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        io::stdout().flush()?;
        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        match dispatch(&mut tasks, &mut store, line.trim()) {
            Ok(ShellFlow::Continue) => {}
            Ok(ShellFlow::Exit) => break,
            Err(err) => eprintln!("error: {:#}", err),
        }
    }
    Ok(())
}

enum ShellFlow {
    Continue,
    Exit,
}

fn dispatch(tasks: &mut TaskStore, store: &mut dyn KvStore, input: &str) -> Result<ShellFlow> {
    let mut words = input.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(ShellFlow::Continue);
    };
    match command {
        "groups" | "ls" => list_groups(tasks),
        "group" => match words.next() {
            Some("add") => {
                tasks.add_group();
                let group = tasks.groups().last().expect("just appended");
                println!("Added {}", group.name);
            }
            Some("rm") => {
                let g = parse_index(words.next(), "group index")?;
                tasks.delete_group(g)?;
                println!("Deleted group {}", g);
            }
            _ => bail!("usage: group add | group rm <g>"),
        },
        "add" => {
            let g = parse_index(words.next(), "group index")?;
            let name = rest(words);
            tasks.add_task(
                g,
                TaskDraft {
                    name,
                    ..TaskDraft::default()
                },
            )?;
            println!("Added task to group {}", g);
        }
        "desc" => {
            let (g, t) = parse_pair(&mut words)?;
            tasks.update_task(
                g,
                t,
                TaskPatch {
                    description: Some(rest(words)),
                    ..TaskPatch::default()
                },
            )?;
            println!("Updated description");
        }
        "due" => {
            let (g, t) = parse_pair(&mut words)?;
            let raw = words.next().ok_or_else(|| anyhow!("missing due date"))?;
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|_| anyhow!("invalid date format (use YYYY-MM-DD): {}", raw))?;
            tasks.update_task(
                g,
                t,
                TaskPatch {
                    due: Some(raw.to_string()),
                    ..TaskPatch::default()
                },
            )?;
            println!("Due date set");
        }
        "toggle" => {
            let (g, t) = parse_pair(&mut words)?;
            tasks.toggle_completed(g, t)?;
            let done = tasks.groups()[g].tasks[t].completed;
            println!("Task marked {}", if done { "done" } else { "not done" });
        }
        "start" => {
            let (g, t) = parse_pair(&mut words)?;
            tasks.toggle_started(g, t)?;
            let started = tasks.groups()[g].tasks[t].started;
            println!("Task {}", if started { "started" } else { "paused" });
        }
        "rm" => {
            let (g, t) = parse_pair(&mut words)?;
            tasks.delete_task(g, t)?;
            println!("Deleted task");
        }
        "select" => {
            let (g, t) = parse_pair(&mut words)?;
            tasks.select(g, t)?;
            println!("Selected {}", tasks.selection().expect("just set").task.name);
        }
        "show" => match tasks.selection() {
            Some(sel) => print_task_detail(&sel.task),
            None => println!("Nothing selected"),
        },
        "clear" => {
            tasks.clear_selection();
            println!("Selection cleared");
        }
        "help" => print_help(),
        "logout" => {
            auth::logout(store)?;
            println!("Logged out");
            return Ok(ShellFlow::Exit);
        }
        "quit" | "exit" => return Ok(ShellFlow::Exit),
        other => bail!("unknown command: {} (try 'help')", other),
    }
    Ok(ShellFlow::Continue)
}

fn list_groups(tasks: &TaskStore) {
    for (g, group) in tasks.groups().iter().enumerate() {
        println!("[{}] {}", g, group.name);
        if group.tasks.is_empty() {
            println!("    (empty)");
        }
        for (t, task) in group.tasks.iter().enumerate() {
            let marker = if task.completed { "x" } else { " " };
            print!("    [{}] {}. {}", marker, t, task.name);
            if task.started && !task.completed {
                print!(" (in progress)");
            }
            if let Some(due) = &task.due {
                print!(" due {}", due);
            }
            println!();
        }
    }
}

fn print_task_detail(task: &Task) {
    println!("{}", task.name);
    if !task.description.is_empty() {
        println!("  {}", task.description);
    }
    println!("  created: {}", task.created);
    if let Some(due) = &task.due {
        println!("  due: {}", due);
    }
    let status = if task.completed {
        "done"
    } else if task.started {
        "in progress"
    } else {
        "not started"
    };
    println!("  status: {}", status);
    println!("  time spent: {}", task.time_spent);
}

fn print_help() {
    println!("groups                 list groups and tasks");
    println!("group add              add a new group");
    println!("group rm <g>           delete group g");
    println!("add <g> <name...>      add a task to group g");
    println!("desc <g> <t> <text...> set a task description");
    println!("due <g> <t> <date>     set a due date (YYYY-MM-DD)");
    println!("toggle <g> <t>         toggle task completion");
    println!("start <g> <t>          toggle task started");
    println!("rm <g> <t>             delete a task");
    println!("select <g> <t>         select a task for detail view");
    println!("show                   show the selected task");
    println!("clear                  clear the selection");
    println!("logout                 log out and exit");
    println!("quit                   exit (tasks are discarded)");
}

fn parse_index(word: Option<&str>, what: &str) -> Result<usize> {
    let raw = word.ok_or_else(|| anyhow!("missing {}", what))?;
    raw.parse()
        .map_err(|_| anyhow!("invalid {}: {}", what, raw))
}

fn parse_pair<'a>(words: &mut impl Iterator<Item = &'a str>) -> Result<(usize, usize)> {
    let g = parse_index(words.next(), "group index")?;
    let t = parse_index(words.next(), "task index")?;
    Ok((g, t))
}

fn rest<'a>(words: impl Iterator<Item = &'a str>) -> String {
    words.collect::<Vec<_>>().join(" ")
}
