//! REPL – the interactive console.
//!
//! One task owns the [`Console`] and multiplexes four inputs: events from
//! the vision client's bus, operator lines from stdin, finished `/copy`
//! fetches and the Ctrl-C signal.
//!
//! Supported slash-commands:
//!   /help                                 – show this list
//!   /show                                 – print the settings form
//!   /streams                              – print the stream table
//!   /status                               – print system and service status
//!   /set team|ntmode <value>              – edit a global setting
//!   /set camera <i> <field> <value>       – edit a camera field
//!   /set switched <i> name|key <value>    – edit a switched camera field
//!   /add                                  – add an empty camera
//!   /add-connected <path>                 – add a camera for a detected device
//!   /add-switched                         – add a switched camera
//!   /remove <i> | /remove-switched <i>    – remove a camera
//!   /alt <i> <path>                       – switch camera i to an alternate path
//!   /load <i> <file>                      – load camera i from a JSON file
//!   /copy <i>                             – copy camera i's live config
//!   /report <file>                        – write an HTML status snapshot
//!   /discard                              – drop unsaved edits
//!   /save                                 – push the settings to the service
//!   /quit | /exit                         – leave

use std::path::PathBuf;

use colored::Colorize;
use frcvision_console::form::{CAMERA_FIELDS, SWITCHED_CAMERA_FIELDS};
use frcvision_console::{Console, Notification, ViewRenderer};
use frcvision_middleware::{
    ClientHandle, Endpoint, FetchedConfig, TopicSubscriber, spawn_camera_config_fetch,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::warn;

use crate::report::html_report;
use crate::view::{TerminalView, status_text, streams_text};

/// A parsed operator command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Show,
    Streams,
    Status,
    SetTeam(String),
    SetClientMode(bool),
    SetCamera {
        index: usize,
        field: String,
        value: String,
    },
    SetSwitched {
        index: usize,
        field: String,
        value: String,
    },
    Add,
    AddConnected(String),
    AddSwitched,
    Remove(usize),
    RemoveSwitched(usize),
    Alternate(usize, String),
    Load(usize, PathBuf),
    Copy(usize),
    Report(PathBuf),
    Discard,
    Save,
    Quit,
}

fn parse_index(arg: Option<&str>) -> Result<usize, String> {
    let arg = arg.ok_or("missing camera index")?;
    arg.parse()
        .map_err(|_| format!("'{arg}' is not a camera index"))
}

/// Rest of the line after skipping `skip` words, so values may contain
/// spaces (e.g. `properties` JSON).
fn rest_after(line: &str, skip: usize) -> String {
    let mut rest = line.trim_start();
    for _ in 0..skip {
        rest = match rest.find(char::is_whitespace) {
            Some(i) => rest[i..].trim_start(),
            None => "",
        };
    }
    rest.trim_end().to_string()
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, String> {
        let mut words = line.split_whitespace();
        let cmd = words.next().unwrap_or_default();
        let command = match cmd {
            "/help" => Command::Help,
            "/show" => Command::Show,
            "/streams" => Command::Streams,
            "/status" => Command::Status,
            "/add" => Command::Add,
            "/add-switched" => Command::AddSwitched,
            "/discard" => Command::Discard,
            "/save" => Command::Save,
            "/quit" | "/exit" => Command::Quit,
            "/add-connected" => {
                let path = rest_after(line, 1);
                if path.is_empty() {
                    return Err("usage: /add-connected <path>".into());
                }
                Command::AddConnected(path)
            }
            "/remove" => Command::Remove(parse_index(words.next())?),
            "/remove-switched" => Command::RemoveSwitched(parse_index(words.next())?),
            "/copy" => Command::Copy(parse_index(words.next())?),
            "/alt" => {
                let index = parse_index(words.next())?;
                let path = rest_after(line, 2);
                if path.is_empty() {
                    return Err("usage: /alt <i> <path>".into());
                }
                Command::Alternate(index, path)
            }
            "/load" => {
                let index = parse_index(words.next())?;
                let file = rest_after(line, 2);
                if file.is_empty() {
                    return Err("usage: /load <i> <file>".into());
                }
                Command::Load(index, PathBuf::from(file))
            }
            "/report" => {
                let file = rest_after(line, 1);
                if file.is_empty() {
                    return Err("usage: /report <file>".into());
                }
                Command::Report(PathBuf::from(file))
            }
            "/set" => return Self::parse_set(line, words.next(), words.next(), words.next()),
            other => return Err(format!("Unknown command: '{other}'")),
        };
        Ok(command)
    }

    fn parse_set(
        line: &str,
        target: Option<&str>,
        second: Option<&str>,
        third: Option<&str>,
    ) -> Result<Self, String> {
        match target {
            Some("team") => Ok(Command::SetTeam(rest_after(line, 2))),
            Some("ntmode") => match second {
                Some("client") => Ok(Command::SetClientMode(true)),
                Some("server") => Ok(Command::SetClientMode(false)),
                _ => Err("usage: /set ntmode client|server".into()),
            },
            Some("camera") => {
                let index = parse_index(second)?;
                let field = third.ok_or("usage: /set camera <i> <field> <value>")?;
                if !CAMERA_FIELDS.contains(&field) {
                    return Err(format!(
                        "unknown camera field '{field}' (one of: {})",
                        CAMERA_FIELDS.join(", ")
                    ));
                }
                Ok(Command::SetCamera {
                    index,
                    field: field.to_string(),
                    value: rest_after(line, 4),
                })
            }
            Some("switched") => {
                let index = parse_index(second)?;
                let field = third.ok_or("usage: /set switched <i> name|key <value>")?;
                if !SWITCHED_CAMERA_FIELDS.contains(&field) {
                    return Err(format!("unknown switched camera field '{field}'"));
                }
                Ok(Command::SetSwitched {
                    index,
                    field: field.to_string(),
                    value: rest_after(line, 4),
                })
            }
            _ => Err("usage: /set team|ntmode|camera|switched …".into()),
        }
    }
}

/// Run the interactive loop until `/quit`, Ctrl-C or end of input.
pub async fn run(
    mut console: Console<TerminalView>,
    client: ClientHandle,
    endpoint: Endpoint,
    mut events: TopicSubscriber,
    mut interrupt: mpsc::UnboundedReceiver<()>,
) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let (fetch_tx, mut fetched) = mpsc::unbounded_channel::<FetchedConfig>();
    prompt().await;

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(event) => console.handle_event(event),
                None => {
                    warn!("event bus closed");
                    break;
                }
            },
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        match Command::parse(line) {
                            Ok(Command::Quit) => {
                                println!("{}", "Goodbye.".green());
                                break;
                            }
                            Ok(Command::Copy(index)) => {
                                spawn_camera_config_fetch(&endpoint, index, fetch_tx.clone());
                                println!("  fetching camera {index} config …");
                            }
                            Ok(cmd) => execute(&mut console, &client, cmd).await,
                            Err(e) => println!(
                                "{} Type {} for available commands.",
                                e.red(),
                                "/help".bold()
                            ),
                        }
                    }
                    prompt().await;
                }
                Ok(None) => break,
                Err(e) => {
                    eprintln!("{}: {}", "Read error".red(), e);
                    break;
                }
            },
            Some(done) = fetched.recv() => {
                console.apply_peer_config(done.index, done.result);
            }
            _ = interrupt.recv() => {
                println!();
                println!("{}", "⚠  Ctrl-C received – closing connection …".yellow().bold());
                break;
            }
        }
    }

    client.shutdown();
}

async fn prompt() {
    let mut stdout = tokio::io::stdout();
    let _ = stdout.write_all(format!("{} ", "frcvision>".bold().cyan()).as_bytes()).await;
    let _ = stdout.flush().await;
}

async fn execute(console: &mut Console<TerminalView>, client: &ClientHandle, cmd: Command) {
    let result = match cmd {
        Command::Help => {
            cmd_help();
            Ok(())
        }
        Command::Show => {
            print!("{}", console.view().settings_text());
            Ok(())
        }
        Command::Streams => {
            print!("{}", streams_text(console.streams()));
            Ok(())
        }
        Command::Status => {
            println!("  connection     : {}", console.state());
            print!("{}", status_text(console.badge(), console.system_status()));
            Ok(())
        }
        Command::SetTeam(team) => {
            console.view_mut().form_mut().team = team;
            Ok(())
        }
        Command::SetClientMode(client_mode) => {
            console.view_mut().form_mut().client_mode = client_mode;
            Ok(())
        }
        Command::SetCamera { index, field, value } => console
            .view_mut()
            .form_mut()
            .cameras
            .get_mut(index)
            .and_then(|camera| camera.field_mut(&field))
            .map(|slot| *slot = value)
            .ok_or_else(|| format!("no camera {index}")),
        Command::SetSwitched { index, field, value } => console
            .view_mut()
            .form_mut()
            .switched_cameras
            .get_mut(index)
            .and_then(|camera| camera.field_mut(&field))
            .map(|slot| *slot = value)
            .ok_or_else(|| format!("no switched camera {index}")),
        Command::Add => {
            console.add_camera();
            Ok(())
        }
        Command::AddConnected(path) => {
            console.add_connected_camera(&path);
            Ok(())
        }
        Command::AddSwitched => {
            console.add_switched_camera();
            Ok(())
        }
        Command::Remove(index) => console.remove_camera(index).map_err(|e| e.to_string()),
        Command::RemoveSwitched(index) => console
            .remove_switched_camera(index)
            .map_err(|e| e.to_string()),
        Command::Alternate(index, path) => console
            .select_alternate_path(index, &path)
            .map_err(|e| e.to_string()),
        Command::Load(index, file) => {
            console.load_camera_file(index, &file);
            Ok(())
        }
        Command::Report(file) => tokio::fs::write(&file, html_report(console))
            .await
            .map(|()| {
                console.view_mut().notify(&Notification::success(format!(
                    "report written to {}",
                    file.display()
                )))
            })
            .map_err(|e| format!("could not write {}: {e}", file.display())),
        Command::Discard => {
            console.discard();
            Ok(())
        }
        Command::Save => console
            .save()
            .and_then(|msg| client.send(msg))
            .map(|()| {
                console
                    .view_mut()
                    .notify(&Notification::success("settings sent to the vision service"))
            })
            .map_err(|e| e.to_string()),
        // Handled by the loop.
        Command::Copy(_) | Command::Quit => Ok(()),
    };

    if let Err(e) = result {
        println!("{} {}", "Error:".red().bold(), e);
    }
}

fn cmd_help() {
    println!();
    println!("{}", "FRCVision Commands".bold().underline());
    let rows = [
        ("/show", "print the settings form"),
        ("/streams", "print active camera streams"),
        ("/status", "print system and vision service status"),
        ("/set team <n>", "set the team number"),
        ("/set ntmode client|server", "set the NetworkTables mode"),
        ("/set camera <i> <field> <value>", "edit a camera field"),
        ("/set switched <i> name|key <v>", "edit a switched camera"),
        ("/add", "add an empty camera"),
        ("/add-connected <path>", "add a camera for a detected device"),
        ("/add-switched", "add a switched camera"),
        ("/remove <i>", "remove camera i"),
        ("/remove-switched <i>", "remove switched camera i"),
        ("/alt <i> <path>", "use an alternate device path"),
        ("/load <i> <file>", "load camera settings from a JSON file"),
        ("/copy <i>", "copy the camera's live settings"),
        ("/report <file>", "write an HTML status snapshot"),
        ("/discard", "drop unsaved edits"),
        ("/save", "save settings to the vision service"),
        ("/quit  /exit", "exit the console"),
    ];
    for (cmd, help) in rows {
        println!("  {:<34} – {}", cmd.bold().cyan(), help);
    }
    println!("  camera fields: {}", CAMERA_FIELDS.join(", ").dimmed());
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_commands() {
        assert_eq!(Command::parse("/show"), Ok(Command::Show));
        assert_eq!(Command::parse("/exit"), Ok(Command::Quit));
        assert_eq!(Command::parse("/remove 2"), Ok(Command::Remove(2)));
        assert_eq!(Command::parse("/copy 0"), Ok(Command::Copy(0)));
        assert!(Command::parse("/remove x").is_err());
        assert!(Command::parse("/remove").is_err());
        assert!(Command::parse("/frobnicate").is_err());
    }

    #[test]
    fn set_camera_keeps_spaces_in_value() {
        let cmd = Command::parse(r#"/set camera 1 properties [{"name": "contrast", "value": 5}]"#);
        assert_eq!(
            cmd,
            Ok(Command::SetCamera {
                index: 1,
                field: "properties".into(),
                value: r#"[{"name": "contrast", "value": 5}]"#.into(),
            })
        );
    }

    #[test]
    fn set_camera_blank_value_clears_field() {
        assert_eq!(
            Command::parse("/set camera 0 width"),
            Ok(Command::SetCamera {
                index: 0,
                field: "width".into(),
                value: String::new(),
            })
        );
        assert!(Command::parse("/set camera 0 colour red").is_err());
    }

    #[test]
    fn set_globals_and_switched() {
        assert_eq!(Command::parse("/set team 294"), Ok(Command::SetTeam("294".into())));
        assert_eq!(
            Command::parse("/set ntmode server"),
            Ok(Command::SetClientMode(false))
        );
        assert!(Command::parse("/set ntmode peer").is_err());
        assert_eq!(
            Command::parse("/set switched 0 key /switched/driver"),
            Ok(Command::SetSwitched {
                index: 0,
                field: "key".into(),
                value: "/switched/driver".into(),
            })
        );
    }

    #[test]
    fn path_arguments() {
        assert_eq!(
            Command::parse("/alt 1 /dev/v4l/by-id/usb cam"),
            Ok(Command::Alternate(1, "/dev/v4l/by-id/usb cam".into()))
        );
        assert_eq!(
            Command::parse("/load 0 front.json"),
            Ok(Command::Load(0, PathBuf::from("front.json")))
        );
        assert_eq!(
            Command::parse("/report status page.html"),
            Ok(Command::Report(PathBuf::from("status page.html")))
        );
        assert!(Command::parse("/report").is_err());
        assert_eq!(
            Command::parse("/add-connected /dev/video2"),
            Ok(Command::AddConnected("/dev/video2".into()))
        );
        assert!(Command::parse("/alt 1").is_err());
    }
}
