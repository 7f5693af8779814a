//! Headless session runner.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use hexmap_core::assets::AssetIndex;
use hexmap_core::config::EditorConfig;
use hexmap_core::dice::RngRolls;
use hexmap_core::editor::Editor;
use hexmap_core::interaction::ArmedAsset;
use hexmap_core::item::ItemId;
use hexmap_core::math::Point;
use hexmap_core::persistence::MapStore;
use tracing::{debug, info, warn};

use crate::assets::{build_asset_index, read_stat_document, DirectoryMarkers, JsonFileStore};
use crate::error::Result;
use crate::protocol::{Command, Response, SessionState};

/// Headless runner configuration.
#[derive(Debug, Clone, Default)]
pub struct HeadlessConfig {
    /// Editor settings.
    pub editor: EditorConfig,
    /// Dice seed. Without one the dice are seeded from the OS.
    pub seed: Option<u64>,
    /// Directory for `load_map` and `save_map` documents.
    pub map_dir: PathBuf,
    /// Output a frame after every command that changed something.
    pub auto_frame: bool,
}

/// One editor session driven by protocol commands.
pub struct HeadlessRunner {
    editor: Editor,
    store: JsonFileStore,
    index: AssetIndex,
    auto_frame: bool,
    finished: bool,
}

impl HeadlessRunner {
    /// Create a runner with filesystem markers and `rand` dice.
    pub fn new(config: HeadlessConfig) -> Self {
        let markers = config
            .editor
            .markers_directory
            .as_deref()
            .map(|dir| DirectoryMarkers::scan(Path::new(dir)))
            .unwrap_or_default();
        let dirs: Vec<&str> = [
            config.editor.tokens_directory.as_deref(),
            config.editor.markers_directory.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect();
        let index = build_asset_index(&dirs);
        let rolls = config.seed.map_or_else(RngRolls::from_entropy, RngRolls::seeded);

        let editor = Editor::new(config.editor, Box::new(markers), Box::new(rolls));
        let mut runner = Self::with_editor(editor, JsonFileStore::new(config.map_dir));
        runner.index = index;
        runner.auto_frame = config.auto_frame;
        runner
    }

    /// Create a runner around an existing editor.
    pub fn with_editor(editor: Editor, store: JsonFileStore) -> Self {
        Self {
            editor,
            store,
            index: AssetIndex::new(),
            auto_frame: false,
            finished: false,
        }
    }

    /// The driven editor.
    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    /// Whether `quit` was received.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Execute one command. Returns every response it produced, in order.
    pub fn execute(&mut self, cmd: &Command) -> Vec<Response> {
        let name = cmd.name();
        debug!(cmd = name, "executing");

        let mut responses = Vec::new();
        match self.apply(cmd) {
            Ok(Some(response)) => responses.push(response),
            Ok(None) => responses.push(Response::ack(name)),
            Err(e) => {
                warn!(cmd = name, error = %e, "command rejected");
                responses.push(Response::error(e.to_string(), Some(name)));
            }
        }

        let lines: Vec<String> = self.editor.drain_log().iter().map(ToString::to_string).collect();
        if !lines.is_empty() {
            responses.push(Response::Log { lines });
        }

        let changes = self.editor.take_changes();
        if self.auto_frame && !changes.is_empty() && !matches!(cmd, Command::Frame) {
            responses.push(Response::Frame {
                frame: self.editor.frame(),
            });
        }
        responses
    }

    fn apply(&mut self, cmd: &Command) -> hexmap_core::Result<Option<Response>> {
        let editor = &mut self.editor;
        match cmd {
            Command::Query => return Ok(Some(Response::State(SessionState::capture(editor)))),
            Command::Hash => {
                return Ok(Some(Response::StateHash {
                    round: editor.combat().session().round(),
                    hash: editor.state_hash(),
                }))
            }
            Command::Frame => {
                return Ok(Some(Response::Frame {
                    frame: editor.frame(),
                }))
            }

            Command::NewMap => editor.new_map(),
            Command::LoadMap { name } => {
                let map = self.store.load(name)?;
                editor.load_map(map);
                let fixed = editor.resolve_assets(&self.index, |p| Path::new(p).exists());
                if fixed > 0 {
                    info!(fixed, "re-linked moved assets");
                }
            }
            Command::SaveMap { name } => self.store.save(name, editor.map())?,
            Command::Resize { width, height } => editor.resize(*width, *height),
            Command::SetBackground {
                path,
                width,
                height,
            } => {
                let size = width.zip(*height);
                editor.set_background(path.clone(), size);
            }
            Command::SetGridOffset { x, y } => editor.set_grid_offset(Point::new(*x, *y)),
            Command::ClearDrawings => editor.clear_drawings(),

            Command::PointerDown { x, y, button } => {
                let outcome = editor.pointer_down(Point::new(*x, *y), *button);
                debug!(?outcome, "pointer down");
            }
            Command::PointerDrag { x, y } => editor.pointer_drag(Point::new(*x, *y)),
            Command::PointerUp => {
                editor.pointer_up()?;
            }
            Command::PointerMove { x, y } => editor.pointer_move(Point::new(*x, *y)),
            Command::PointerLeave => editor.pointer_leave(),
            Command::Zoom { direction } => {
                editor.zoom(*direction);
            }
            Command::SetTool { tool } => editor.set_tool(*tool),
            Command::Arm { path, kind } => editor.arm(ArmedAsset {
                path: path.clone(),
                kind: *kind,
            }),
            Command::Disarm => editor.disarm(),
            Command::Select { item } => editor.select(item.map(ItemId)),
            Command::Escape => editor.escape(),
            Command::ConfirmSize { size } => {
                editor.confirm_size(*size)?;
            }
            Command::CancelPrompt => {
                editor.cancel_prompt();
            }

            Command::Delete { item } => {
                editor.delete_item(ItemId(*item))?;
            }
            Command::DeleteSelected => {
                editor.delete_selected();
            }
            Command::ToggleBarrier { item } => {
                editor.toggle_barrier(ItemId(*item))?;
            }
            Command::SetBarrierRadius { item, radius } => {
                editor.set_barrier_radius(ItemId(*item), *radius)?;
            }
            Command::SetFaction { item, faction } => editor.set_faction(ItemId(*item), *faction)?,
            Command::SetName { item, name } => editor.set_custom_name(ItemId(*item), name.clone())?,
            Command::ToggleMarker { item, marker } => {
                editor.toggle_marker(ItemId(*item), marker)?;
            }
            Command::SetAttribute {
                item,
                attribute,
                value,
            } => editor.set_attribute(ItemId(*item), *attribute, *value)?,
            Command::LinkFile { item, path } => {
                let text = path.as_deref().and_then(read_stat_document);
                let imported = editor.link_file(ItemId(*item), path.clone(), text.as_deref())?;
                if !imported.is_empty() {
                    info!(item, attributes = ?imported, "stat block imported");
                }
            }

            Command::StartTurn { item } => editor.start_turn(ItemId(*item))?,
            Command::EndTurn => {
                editor.end_turn();
            }
            Command::NextRound => editor.next_round(),
            Command::ResetCombat => editor.reset_combat(),
            Command::FirstFaction => {
                editor.decide_first_faction();
            }
            Command::QuickAction => editor.use_quick_action()?,
            Command::FullAction => editor.use_full_action()?,
            Command::FreeAction => editor.use_free_action(),
            Command::Overcharge => editor.use_overcharge()?,
            Command::Movement { gain } => editor.adjust_movement(*gain),
            Command::Attack { .. } => {
                if let Some(request) = cmd.attack_request() {
                    editor.attack(&request)?;
                }
            }
            Command::Roll { expr } => {
                editor.roll_dice(expr)?;
            }

            Command::Tick { ms } => editor.tick(*ms),
            Command::Quit => {
                self.finished = true;
                return Ok(Some(Response::Bye));
            }
        }
        Ok(None)
    }

    /// Run a JSON-lines session until `quit` or end of input.
    ///
    /// Blank lines and lines starting with `#` are skipped. Lines that do not
    /// parse produce an `error` response and the session continues.
    /// Returns the final state hash.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, output: &mut W) -> Result<u64> {
        write_response(output, &Response::ready(self.editor.combat().session().round()))?;

        for line in input.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match Command::from_json(line) {
                Ok(cmd) => {
                    for response in self.execute(&cmd) {
                        write_response(output, &response)?;
                    }
                }
                Err(e) => {
                    write_response(output, &Response::error(format!("Parse error: {e}"), None))?;
                }
            }

            if self.finished {
                break;
            }
        }

        let hash = self.editor.state_hash();
        info!(hash, "session finished");
        Ok(hash)
    }
}

fn write_response<W: Write>(output: &mut W, response: &Response) -> Result<()> {
    output.write_all(response.to_json_line().as_bytes())?;
    output.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexmap_core::combat::TurnState;
    use hexmap_core::hex::HexCoord;
    use hexmap_test_utils::determinism::screen_of;
    use hexmap_test_utils::fixtures::scripted_editor;

    fn runner(rolls: &[u32]) -> HeadlessRunner {
        HeadlessRunner::with_editor(scripted_editor(rolls), JsonFileStore::new(std::env::temp_dir()))
    }

    fn send(runner: &mut HeadlessRunner, json: &str) -> Vec<Response> {
        runner.execute(&Command::from_json(json).unwrap())
    }

    fn click(runner: &mut HeadlessRunner, hex: HexCoord) {
        let at = screen_of(runner.editor(), hex);
        runner.execute(&Command::PointerDown {
            x: at.x,
            y: at.y,
            button: Default::default(),
        });
        runner.execute(&Command::PointerUp);
    }

    fn place_two(runner: &mut HeadlessRunner) {
        send(runner, r#"{"cmd":"arm","path":"tokens/atlas.png"}"#);
        click(runner, HexCoord::new(0, 0));
        click(runner, HexCoord::new(2, 0));
        send(runner, r#"{"cmd":"disarm"}"#);
    }

    #[test]
    fn test_placement_and_query() {
        let mut runner = runner(&[]);
        place_two(&mut runner);

        let responses = send(&mut runner, r#"{"cmd":"query"}"#);
        let Response::State(state) = &responses[0] else {
            panic!("expected state, got {responses:?}");
        };
        assert_eq!(state.items.len(), 2);
        assert_eq!(state.round, 1);
        assert_eq!(state.hash, runner.editor().state_hash());
    }

    #[test]
    fn test_turn_narration_is_logged() {
        let mut runner = runner(&[]);
        place_two(&mut runner);

        let responses = send(&mut runner, r#"{"cmd":"start_turn","item":0}"#);
        assert_eq!(responses[0], Response::ack("start_turn"));
        let Response::Log { lines } = &responses[1] else {
            panic!("expected log, got {responses:?}");
        };
        assert_eq!(lines, &vec!["=== atlas's Turn Begins ===".to_string()]);
        assert_eq!(
            runner.editor().combat().session().state_of(ItemId(0)),
            TurnState::ActingNow
        );
    }

    #[test]
    fn test_rejection_is_an_error_response() {
        let mut runner = runner(&[]);
        let responses = send(&mut runner, r#"{"cmd":"attack","attacker":0,"target":1,"damage":"1d6"}"#);
        assert!(matches!(
            &responses[0],
            Response::Error { cmd: Some(cmd), .. } if cmd == "attack"
        ));
        assert!(matches!(&responses[1], Response::Log { .. }));
    }

    #[test]
    fn test_auto_frame_follows_changes() {
        let mut runner = runner(&[]);
        runner.auto_frame = true;
        runner.editor.take_changes();

        let responses = send(&mut runner, r#"{"cmd":"zoom","direction":"in"}"#);
        assert!(matches!(responses.last(), Some(Response::Frame { .. })));

        let responses = send(&mut runner, r#"{"cmd":"hash"}"#);
        assert_eq!(responses.len(), 1);
    }

    #[test]
    fn test_run_reads_lines_until_quit() {
        let mut runner = runner(&[]);
        let input = "\n# comment\n{\"cmd\":\"roll\",\"expr\":\"3\"}\nnot json\n{\"cmd\":\"quit\"}\n{\"cmd\":\"new_map\"}\n";
        let mut output = Vec::new();

        runner.run(input.as_bytes(), &mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].contains(r#""type":"ready""#));
        assert!(lines[1].contains(r#""type":"ack""#));
        assert!(lines[2].contains(r#""type":"log""#));
        assert!(lines[3].contains("Parse error"));
        assert!(lines[4].contains(r#""type":"bye""#));
        assert_eq!(lines.len(), 5);
        assert!(runner.is_finished());
    }
}
