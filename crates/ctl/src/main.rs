use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use scheduler_client::{ClientConfig, Outcome, ScheduleClient, API_URL_ENV};
use scheduler_core::{makespan, NewMachine, NewTask, Precedence, ProductionLog, TaskEdit};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "schedulerctl", about = "Drive the job-shop scheduling backend")]
struct Args {
    /// Backend base URL, e.g. http://127.0.0.1:5000
    #[arg(long, env = API_URL_ENV)]
    api_url: String,

    /// Log level (env-filter syntax).
    #[arg(long, default_value = "info")]
    log: String,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Show the current schedule and its makespan.
    Schedule,
    /// List machines.
    Machines,
    /// List task ids and names.
    Tasks,
    Task {
        #[command(subcommand)]
        task: TaskCmd,
    },
    Precedence {
        #[command(subcommand)]
        rule: PrecedenceCmd,
    },
    Machine {
        #[command(subcommand)]
        machine: MachineCmd,
    },
    /// Record production results for a task.
    Log {
        #[arg(long)]
        task_id: i64,
        #[arg(long)]
        resource: String,
        #[arg(long)]
        count: i64,
    },
    /// Re-plan all unscheduled tasks.
    Optimize {
        /// Schedule start (RFC 3339); the server uses its own clock when omitted.
        #[arg(long)]
        start: Option<DateTime<Utc>>,
    },
}

#[derive(Subcommand, Debug)]
enum TaskCmd {
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        hours: f64,
        #[arg(long)]
        machine: String,
        #[arg(long, default_value_t = 1)]
        job_id: i64,
    },
    Edit {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        hours: Option<f64>,
        #[arg(long)]
        machine: Option<String>,
    },
    Status {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        status: String,
    },
    Delete {
        #[arg(long)]
        id: i64,
    },
}

#[derive(Subcommand, Debug)]
enum PrecedenceCmd {
    /// `--successor` may only start once `--predecessor` has finished.
    Add {
        #[arg(long)]
        predecessor: i64,
        #[arg(long)]
        successor: i64,
    },
}

#[derive(Subcommand, Debug)]
enum MachineCmd {
    Add {
        #[arg(long)]
        name: String,
        #[arg(long, default_value_t = 1)]
        capacity: i64,
    },
    Delete {
        #[arg(long)]
        id: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&args.log))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config = ClientConfig::new(&args.api_url).context("invalid --api-url")?;
    tracing::debug!(api_url = %config.base_url, "using backend");
    let client = ScheduleClient::over_http(config);

    match args.cmd {
        Cmd::Schedule => {
            let outcome = client.fetch_schedule().await;
            let tasks = client.store().snapshot().tasks;
            print_json(&tasks)?;
            if let Some(span) = makespan(&tasks) {
                println!("makespan: {}h {:02}m", span.num_hours(), span.num_minutes() % 60);
            }
            finish(outcome)?;
        }
        Cmd::Machines => {
            client.fetch_machines().await;
            print_json(&client.store().snapshot().machines)?;
        }
        Cmd::Tasks => {
            let outcome = client.fetch_dropdown_tasks().await;
            print_json(&client.store().snapshot().dropdown_tasks)?;
            finish(outcome)?;
        }
        Cmd::Task { task } => match task {
            TaskCmd::Add {
                name,
                hours,
                machine,
                job_id,
            } => {
                let outcome = client
                    .add_task(NewTask {
                        name,
                        duration_hours: hours,
                        machine_name: machine,
                        job_id,
                    })
                    .await;
                finish_with_schedule(&client, outcome)?;
            }
            TaskCmd::Edit {
                id,
                name,
                hours,
                machine,
            } => {
                client.fetch_schedule().await;
                let completed = client
                    .store()
                    .snapshot()
                    .tasks
                    .iter()
                    .any(|t| t.task_id == id && t.is_completed());
                if completed {
                    eprintln!("note: task {id} is Completed; editing resets it to Pending");
                }
                let edit = TaskEdit {
                    name,
                    duration_hours: hours,
                    machine_name: machine,
                };
                let outcome = client.edit_task(id, edit).await;
                finish_with_schedule(&client, outcome)?;
            }
            TaskCmd::Status { id, status } => {
                let outcome = client.update_task_status(id, &status).await;
                finish_with_schedule(&client, outcome)?;
            }
            TaskCmd::Delete { id } => {
                let outcome = client.delete_task(id).await;
                finish_with_schedule(&client, outcome)?;
            }
        },
        Cmd::Precedence { rule } => match rule {
            PrecedenceCmd::Add {
                predecessor,
                successor,
            } => {
                let outcome = client
                    .add_precedence(Precedence {
                        predecessor_id: predecessor,
                        successor_id: successor,
                    })
                    .await;
                finish(outcome)?;
            }
        },
        Cmd::Machine { machine } => {
            let outcome = match machine {
                MachineCmd::Add { name, capacity } => {
                    client.add_machine(NewMachine { name, capacity }).await
                }
                MachineCmd::Delete { id } => client.delete_machine(id).await,
            };
            if outcome.succeeded() {
                print_json(&client.store().snapshot().machines)?;
            }
            finish(outcome)?;
        }
        Cmd::Log {
            task_id,
            resource,
            count,
        } => {
            let outcome = client
                .log_production(ProductionLog {
                    task_id,
                    resource_used: resource,
                    product_count: count,
                })
                .await;
            finish_with_schedule(&client, outcome)?;
        }
        Cmd::Optimize { start } => {
            let outcome = client.run_optimization(start).await;
            if let Some(report) = &outcome.optimizer {
                if let Some(minutes) = report.makespan_minutes {
                    println!("optimizer makespan: {minutes} min");
                }
            }
            finish_with_schedule(&client, outcome)?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn finish_with_schedule(client: &ScheduleClient, outcome: Outcome) -> anyhow::Result<()> {
    if outcome.succeeded() {
        print_json(&client.store().snapshot().tasks)?;
    }
    finish(outcome)
}

/// Prints the outcome; anything the server did not carry out is an error exit.
fn finish(outcome: Outcome) -> anyhow::Result<()> {
    if !outcome.succeeded() {
        bail!("{}", outcome.message);
    }
    if outcome.needs_optimizer() {
        eprintln!("warning: {}", outcome.message);
    } else {
        println!("{}", outcome.message);
    }
    Ok(())
}
