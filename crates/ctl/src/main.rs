use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::{Map, Value};
use signal_core::{
    api::UpdateCountsResponse,
    simulation::{SimStep, Simulator},
    CountSnapshot, Direction, SchedulerStatus, SignalPlan, SignalScheduler,
};

#[derive(Parser, Debug)]
#[command(name = "signalctl")]
struct Args {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Push vehicle counts; directions left out keep their previous value.
    Update {
        #[arg(long)]
        daemon: String,
        #[arg(long)]
        north: Option<u32>,
        #[arg(long)]
        south: Option<u32>,
        #[arg(long)]
        east: Option<u32>,
        #[arg(long)]
        west: Option<u32>,
    },
    /// Ask the daemon for the next green phase.
    Schedule {
        #[arg(long)]
        daemon: String,
    },
    Status {
        #[arg(long)]
        daemon: String,
    },
    /// Drive the scheduler with simulated traffic.
    ///
    /// Without --daemon an in-process scheduler is used.
    Simulate {
        #[arg(long)]
        daemon: Option<String>,
        #[arg(long, default_value_t = 20)]
        rounds: u32,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Initial queues as north,south,east,west.
        #[arg(long, value_delimiter = ',', default_values_t = [0, 0, 0, 0])]
        initial: Vec<u32>,
    },
}

struct Client {
    http: reqwest::Client,
    base: String,
}

impl Client {
    fn new(daemon: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: daemon.trim_end_matches('/').to_string(),
        }
    }

    async fn update(&self, counts: &Map<String, Value>) -> anyhow::Result<UpdateCountsResponse> {
        let url = format!("{}/update_counts", self.base);
        let resp = self
            .http
            .post(url)
            .json(counts)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(resp)
    }

    async fn schedule(&self) -> anyhow::Result<SignalPlan> {
        let url = format!("{}/get_signal_times", self.base);
        let resp = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(resp)
    }

    async fn status(&self) -> anyhow::Result<SchedulerStatus> {
        let url = format!("{}/v1/status", self.base);
        let resp = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(resp)
    }
}

fn counts_payload(counts: &CountSnapshot) -> Map<String, Value> {
    counts
        .iter()
        .map(|(d, c)| (d.as_str().to_string(), Value::from(c)))
        .collect()
}

fn print_step(step: &SimStep) {
    let queues: Vec<String> = step
        .counts_before
        .iter()
        .map(|(d, c)| format!("{d}={c}"))
        .collect();
    let green = match step.plan.green() {
        Some((d, secs)) => format!("{d} {secs}s"),
        None => "none".to_string(),
    };
    println!(
        "round {:>3}  [{}]  green: {:<10} -{} +{}",
        step.round,
        queues.join(" "),
        green,
        step.discharged,
        step.arrived
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    match args.cmd {
        Cmd::Update {
            daemon,
            north,
            south,
            east,
            west,
        } => {
            let mut counts = Map::new();
            for (d, c) in Direction::ALL.into_iter().zip([north, south, east, west]) {
                if let Some(c) = c {
                    counts.insert(d.as_str().to_string(), Value::from(c));
                }
            }
            anyhow::ensure!(!counts.is_empty(), "no counts given");
            let resp = Client::new(&daemon).update(&counts).await?;
            println!("{}", serde_json::to_string_pretty(&resp)?);
            anyhow::ensure!(resp.is_success(), "daemon rejected update");
        }
        Cmd::Schedule { daemon } => {
            let plan = Client::new(&daemon).schedule().await?;
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        Cmd::Status { daemon } => {
            let status = Client::new(&daemon).status().await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Cmd::Simulate {
            daemon,
            rounds,
            seed,
            initial,
        } => {
            let initial: [u32; 4] = initial
                .try_into()
                .map_err(|_| anyhow::anyhow!("--initial takes exactly four counts"))?;
            let mut sim = Simulator::new(seed, CountSnapshot::from_counts(initial));

            match daemon {
                Some(daemon) => {
                    let client = Client::new(&daemon);
                    for _ in 0..rounds {
                        let resp = client
                            .update(&counts_payload(sim.counts()))
                            .await
                            .context("push counts")?;
                        anyhow::ensure!(resp.is_success(), "daemon rejected update: {}", resp.message);
                        let plan = client.schedule().await.context("fetch plan")?;
                        print_step(&sim.advance(plan));
                    }
                }
                None => {
                    let mut scheduler = SignalScheduler::new();
                    for _ in 0..rounds {
                        print_step(&sim.step(&mut scheduler));
                    }
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_carries_every_direction() {
        let payload = counts_payload(&CountSnapshot::from_counts([3, 0, 7, 1]));
        assert_eq!(
            Value::Object(payload),
            serde_json::json!({"north": 3, "south": 0, "east": 7, "west": 1})
        );
    }

    #[test]
    fn simulate_accepts_initial_queues() {
        let args = Args::try_parse_from(["signalctl", "simulate", "--initial", "1,2,3,4"]).unwrap();
        let Cmd::Simulate { initial, daemon, .. } = args.cmd else {
            panic!("expected simulate");
        };
        assert_eq!(initial, vec![1, 2, 3, 4]);
        assert!(daemon.is_none());
    }
}
