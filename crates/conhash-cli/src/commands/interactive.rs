use std::io::{BufRead, Write};

use anyhow::Result;
use conhash_core::{ApiConfig, DEFAULT_NODE_HOST, DEFAULT_NODE_PORT, Node};
use conhash_ring::RingManager;

use super::report::{print_distribution, print_ring_status};

const DEFAULT_TEST_KEYS: usize = 1000;
const DEFAULT_TEST_PREFIX: &str = "testkey";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add { id: String, host: String, port: u16 },
    Remove { id: String },
    Lookup { key: String },
    Status,
    Test { key_count: usize, prefix: String },
    Reset,
    Help,
    Exit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, String> {
        let mut parts = line.split_whitespace();
        let Some(name) = parts.next() else {
            return Err("empty command".to_string());
        };
        let args: Vec<&str> = parts.collect();

        match name {
            "add" => {
                let id = args.first().ok_or("usage: add <id> [host] [port]")?;
                let host = args.get(1).copied().unwrap_or(DEFAULT_NODE_HOST);
                let port = match args.get(2) {
                    Some(p) => p
                        .parse::<u16>()
                        .ok()
                        .filter(|p| *p > 0)
                        .ok_or_else(|| format!("invalid port: {p}"))?,
                    None => DEFAULT_NODE_PORT,
                };
                Ok(Self::Add {
                    id: id.to_string(),
                    host: host.to_string(),
                    port,
                })
            }
            "remove" => {
                let id = args.first().ok_or("usage: remove <id>")?;
                Ok(Self::Remove { id: id.to_string() })
            }
            "lookup" => {
                if args.is_empty() {
                    return Err("usage: lookup <key>".to_string());
                }
                Ok(Self::Lookup {
                    key: args.join(" "),
                })
            }
            "status" => Ok(Self::Status),
            "test" => {
                let key_count = match args.first() {
                    Some(n) => n
                        .parse::<usize>()
                        .map_err(|_| format!("invalid key count: {n}"))?,
                    None => DEFAULT_TEST_KEYS,
                };
                let limits = ApiConfig::default();
                if key_count < limits.min_distribution_keys
                    || key_count > limits.max_distribution_keys
                {
                    return Err(format!(
                        "key_count must be between {} and {}",
                        limits.min_distribution_keys, limits.max_distribution_keys
                    ));
                }
                let prefix = args.get(1).copied().unwrap_or(DEFAULT_TEST_PREFIX);
                Ok(Self::Test {
                    key_count,
                    prefix: prefix.to_string(),
                })
            }
            "reset" => Ok(Self::Reset),
            "help" => Ok(Self::Help),
            "exit" | "quit" => Ok(Self::Exit),
            other => Err(format!("unknown command: {other}")),
        }
    }
}

fn print_help(out: &mut impl Write) -> Result<()> {
    writeln!(out, "Commands:")?;
    writeln!(out, "  add <id> [host] [port]   register a node")?;
    writeln!(out, "  remove <id>              deregister a node")?;
    writeln!(out, "  lookup <key>             find the owner of a key")?;
    writeln!(out, "  status                   show ring status")?;
    writeln!(out, "  test [count] [prefix]    run a distribution test")?;
    writeln!(out, "  reset                    remove every node")?;
    writeln!(out, "  exit                     leave")?;
    Ok(())
}

/// Read commands from `input` until `exit` or end of input.
pub fn run(ring: &RingManager, input: impl BufRead, out: &mut impl Write) -> Result<()> {
    print_help(out)?;

    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                writeln!(out, "error: {e}")?;
                continue;
            }
        };

        match command {
            Command::Add { id, host, port } => {
                let node = Node::new(id, host, port);
                let label = node.to_string();
                if ring.register_node(node) {
                    writeln!(out, "added {label}")?;
                } else {
                    writeln!(out, "already registered: {label}")?;
                }
            }
            Command::Remove { id } => {
                if ring.deregister_node(&id) {
                    writeln!(out, "removed {id}")?;
                } else {
                    writeln!(out, "not registered: {id}")?;
                }
            }
            Command::Lookup { key } => match ring.resolve(&key) {
                Some(node) => writeln!(out, "{key} -> {} ({})", node.id(), node.address())?,
                None => writeln!(out, "{key} -> no owner (ring is empty)")?,
            },
            Command::Status => print_ring_status(ring, out)?,
            Command::Test { key_count, prefix } => {
                print_distribution(&ring.distribution(&prefix, key_count), out)?
            }
            Command::Reset => {
                ring.reset();
                writeln!(out, "ring reset")?;
            }
            Command::Help => print_help(out)?,
            Command::Exit => break,
        }
    }

    writeln!(out, "bye")?;
    Ok(())
}
