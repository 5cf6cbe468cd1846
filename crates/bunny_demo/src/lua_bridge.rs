//! Rust <-> Lua bridge for scripted controls.
//!
//! A script may define `on_update(dt)`. Before each call Rust publishes the
//! frame's input and the current demo state into the `engine` table; after the
//! call it reads `engine.state` back and that becomes the new state. Scripts
//! never see the camera object itself, only plain numbers.
//!
//! Held keys are published as a lookup table (`_held`) so the whole snapshot
//! is set in one pass without a closure per key. Edge queries and mouse
//! buttons are scoped functions over the frame's `InputState`; they are only
//! valid while `on_update` runs.
//!
//! Reload strategy: on file change (mtime polling) or a manual trigger, a
//! **fresh Lua state** is created and the script is re-executed from scratch.
//! Scripts lose their locals on reload; the demo state lives in Rust and
//! survives.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use bunny_core::InputState;
use mlua::prelude::*;

use crate::controls::DemoState;

/// Status of the Lua runtime for display in the debug overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LuaStatus {
    /// Script loaded and running normally.
    Loaded,
    /// Script had an error; the demo is using the Rust control scheme.
    Error,
    /// No script file found; the demo is using the Rust control scheme.
    Fallback,
}

impl LuaStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Loaded => "Lua: loaded",
            Self::Error => "Lua: ERROR",
            Self::Fallback => "Lua: fallback",
        }
    }
}

impl std::fmt::Display for LuaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

pub struct LuaBridge {
    lua: Lua,
    script_path: PathBuf,
    last_modified: Option<SystemTime>,
    status: LuaStatus,
    last_error: Option<String>,
}

impl LuaBridge {
    /// If the script file doesn't exist, starts in Fallback mode.
    pub fn new(script_path: PathBuf) -> Self {
        let lua = Lua::new();
        let mut bridge = Self {
            lua,
            script_path,
            last_modified: None,
            status: LuaStatus::Fallback,
            last_error: None,
        };
        bridge.try_load_script();
        bridge
    }

    pub fn status(&self) -> LuaStatus {
        self.status
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn script_path(&self) -> &Path {
        &self.script_path
    }

    /// Reload if the script's mtime changed. Call between frames.
    pub fn check_reload(&mut self) {
        let current_mtime = match std::fs::metadata(&self.script_path) {
            Ok(meta) => meta.modified().ok(),
            Err(_) => return,
        };

        if current_mtime != self.last_modified {
            log::info!(
                "Lua script changed, reloading: {}",
                self.script_path.display()
            );
            self.try_load_script();
        }
    }

    pub fn force_reload(&mut self) {
        log::info!("Lua script force reload: {}", self.script_path.display());
        self.try_load_script();
    }

    /// Runs `on_update(dt)` and returns the state the script left behind, or
    /// None when Lua is unavailable or the call failed.
    pub fn call_update(
        &self,
        dt: f32,
        input: &InputState,
        state: &DemoState,
    ) -> Option<DemoState> {
        if self.status != LuaStatus::Loaded {
            return None;
        }

        match self.call_update_inner(dt, input, state) {
            Ok(next) => Some(next),
            Err(err) => {
                log::error!("Lua on_update error: {}", err);
                None
            }
        }
    }

    fn call_update_inner(
        &self,
        dt: f32,
        input: &InputState,
        state: &DemoState,
    ) -> LuaResult<DemoState> {
        let engine: LuaTable = self.lua.globals().get("engine")?;
        let input_table: LuaTable = engine.get("input")?;
        let state_table: LuaTable = engine.get("state")?;

        let held_set = self.lua.create_table()?;
        for key in input.held_keys() {
            held_set.set(key, true)?;
        }
        input_table.set("_held", held_set)?;
        input_table.set("_scroll_y", input.scroll().y)?;
        let mouse = input.mouse_pos();
        input_table.set("mouse_x", mouse.x)?;
        input_table.set("mouse_y", mouse.y)?;

        state_table.set("offset", state.offset)?;
        state_table.set("camera_x", state.camera.position.x)?;
        state_table.set("camera_y", state.camera.position.y)?;
        state_table.set("rotation", state.camera.rotation)?;
        state_table.set("zoom", state.camera.zoom)?;

        let on_update: LuaFunction = self.lua.globals().get("on_update")?;
        self.lua.scope(|scope| {
            let key_pressed =
                scope.create_function(|_, code: String| Ok(input.key_pressed(&code)))?;
            let key_released =
                scope.create_function(|_, code: String| Ok(input.key_released(&code)))?;
            let mouse_down =
                scope.create_function(|_, button: String| Ok(input.mouse_down(&button)))?;
            let mouse_pressed =
                scope.create_function(|_, button: String| Ok(input.mouse_pressed(&button)))?;
            let mouse_released =
                scope.create_function(|_, button: String| Ok(input.mouse_released(&button)))?;
            input_table.set("key_pressed", key_pressed)?;
            input_table.set("key_released", key_released)?;
            input_table.set("mouse_down", mouse_down)?;
            input_table.set("mouse_pressed", mouse_pressed)?;
            input_table.set("mouse_released", mouse_released)?;
            on_update.call::<()>(dt)
        })?;

        let mut next = *state;
        next.offset = state_table.get("offset")?;
        next.camera.position.x = state_table.get("camera_x")?;
        next.camera.position.y = state_table.get("camera_y")?;
        next.camera.rotation = state_table.get("rotation")?;
        next.camera.zoom = state_table.get("zoom")?;
        Ok(next)
    }

    fn try_load_script(&mut self) {
        if !self.script_path.exists() {
            log::warn!(
                "Lua script not found: {}. Using Rust controls.",
                self.script_path.display()
            );
            self.status = LuaStatus::Fallback;
            self.last_error = None;
            self.last_modified = None;
            return;
        }

        self.last_modified = std::fs::metadata(&self.script_path)
            .ok()
            .and_then(|m| m.modified().ok());

        // Fresh state: no globals survive a reload.
        self.lua = Lua::new();

        if let Err(err) = self.setup_engine_api() {
            let msg = format!("Failed to setup Lua engine API: {}", err);
            log::error!("{}", msg);
            self.status = LuaStatus::Error;
            self.last_error = Some(msg);
            return;
        }

        let source = match std::fs::read_to_string(&self.script_path) {
            Ok(source) => source,
            Err(err) => {
                let msg = format!("Failed to read Lua script: {}", err);
                log::error!("{}", msg);
                self.status = LuaStatus::Error;
                self.last_error = Some(msg);
                return;
            }
        };

        let loaded = self
            .lua
            .load(&source)
            .set_name(self.script_path.to_string_lossy())
            .exec()
            .and_then(|()| self.lua.globals().get::<LuaFunction>("on_update"));
        match loaded {
            Ok(_) => {
                self.status = LuaStatus::Loaded;
                self.last_error = None;
                log::info!("Lua script loaded: {}", self.script_path.display());

                if let Ok(on_init) = self.lua.globals().get::<LuaFunction>("on_init") {
                    if let Err(err) = on_init.call::<()>(()) {
                        log::error!("Lua on_init error: {}", err);
                    }
                }
            }
            Err(err) => {
                let msg = format!("Lua script load error: {}", err);
                log::error!("{}", msg);
                self.status = LuaStatus::Error;
                self.last_error = Some(msg);
            }
        }
    }

    /// Build the `engine` global table that scripts interact with.
    ///
    /// Layout:
    ///   engine.input._held          -- key code -> true for held keys
    ///   engine.input.key_down(code) -- lookup over _held
    ///   engine.input.key_pressed(code), key_released(code)
    ///   engine.input.mouse_down(btn), mouse_pressed(btn), mouse_released(btn)
    ///                               -- bound per on_update call
    ///   engine.input.scroll_y()     -- this frame's vertical scroll
    ///   engine.input.mouse_x/y      -- pointer position in screen pixels
    ///   engine.state.offset, camera_x, camera_y, rotation, zoom
    ///                               -- read/write, copied back after on_update
    fn setup_engine_api(&self) -> LuaResult<()> {
        let lua = &self.lua;
        let engine = lua.create_table()?;

        let input_table = lua.create_table()?;
        input_table.set("_held", lua.create_table()?)?;
        input_table.set("_scroll_y", 0.0f32)?;
        input_table.set("mouse_x", 0.0f32)?;
        input_table.set("mouse_y", 0.0f32)?;

        let key_down = lua.create_function(|lua_ctx, code: String| {
            let engine: LuaTable = lua_ctx.globals().get("engine")?;
            let input: LuaTable = engine.get("input")?;
            let held: LuaTable = input.get("_held")?;
            Ok(held.get::<bool>(code.as_str()).unwrap_or(false))
        })?;
        input_table.set("key_down", key_down)?;

        let scroll_y = lua.create_function(|lua_ctx, ()| {
            let engine: LuaTable = lua_ctx.globals().get("engine")?;
            let input: LuaTable = engine.get("input")?;
            input.get::<f64>("_scroll_y")
        })?;
        input_table.set("scroll_y", scroll_y)?;

        engine.set("input", input_table)?;

        let state_table = lua.create_table()?;
        let initial = DemoState::new();
        state_table.set("offset", initial.offset)?;
        state_table.set("camera_x", initial.camera.position.x)?;
        state_table.set("camera_y", initial.camera.position.y)?;
        state_table.set("rotation", initial.camera.rotation)?;
        state_table.set("zoom", initial.camera.zoom)?;
        engine.set("state", state_table)?;

        lua.globals().set("engine", engine)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::ControlScheme;
    use glam::Vec2;
    use std::io::Write;

    const VALID_LUA_SCRIPT: &str = r#"
function on_update(dt)
    engine.state.offset = engine.state.offset + 10 * dt
end
"#;

    const INVALID_LUA_SCRIPT: &str = "this is not valid lua !@#$";

    fn shipped_script() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../assets/scripts/bunnies.lua")
    }

    fn temp_lua_path(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!(
            "bunny_test_lua_bridge_{}_{}.lua",
            name,
            std::process::id()
        ));
        path
    }

    fn write_temp_script(path: &PathBuf, content: &str) {
        let mut f = std::fs::File::create(path).expect("failed to create temp script");
        f.write_all(content.as_bytes())
            .expect("failed to write temp script");
        f.flush().expect("failed to flush temp script");
    }

    fn held(keys: &[&str]) -> InputState {
        let mut input = InputState::new();
        input.set_held(keys.iter().copied());
        input
    }

    #[test]
    fn lua_status_display_matches_label() {
        for variant in [LuaStatus::Loaded, LuaStatus::Error, LuaStatus::Fallback] {
            assert!(!variant.label().is_empty());
            assert_eq!(format!("{}", variant), variant.label());
        }
    }

    #[test]
    fn bridge_fallback_when_no_script() {
        let bridge = LuaBridge::new(PathBuf::from("__nonexistent_script_for_test_42__.lua"));
        assert_eq!(bridge.status(), LuaStatus::Fallback);
        let result = bridge.call_update(1.0 / 60.0, &InputState::new(), &DemoState::new());
        assert!(result.is_none(), "call_update should return None in Fallback mode");
    }

    #[test]
    fn bridge_loads_valid_script() {
        let path = temp_lua_path("valid");
        write_temp_script(&path, VALID_LUA_SCRIPT);

        let bridge = LuaBridge::new(path.clone());
        assert_eq!(
            bridge.status(),
            LuaStatus::Loaded,
            "Expected Loaded, got {:?}. Error: {:?}",
            bridge.status(),
            bridge.last_error()
        );

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn bridge_error_on_invalid_script() {
        let path = temp_lua_path("invalid");
        write_temp_script(&path, INVALID_LUA_SCRIPT);

        let bridge = LuaBridge::new(path.clone());
        assert_eq!(bridge.status(), LuaStatus::Error);
        assert!(bridge.last_error().is_some());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn script_without_on_update_is_an_error() {
        let path = temp_lua_path("no_update");
        write_temp_script(&path, "local x = 1\n");

        let bridge = LuaBridge::new(path.clone());
        assert_eq!(bridge.status(), LuaStatus::Error);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn call_update_returns_script_state() {
        let path = temp_lua_path("state");
        write_temp_script(&path, VALID_LUA_SCRIPT);

        let bridge = LuaBridge::new(path.clone());
        let mut state = DemoState::new();
        state.offset = 5.0;
        let next = bridge
            .call_update(0.5, &InputState::new(), &state)
            .expect("call_update should return Some(state)");
        assert_eq!(next.offset, 10.0);
        assert_eq!(next.camera, state.camera);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn script_sees_input_snapshot() {
        let path = temp_lua_path("input");
        write_temp_script(
            &path,
            r#"
function on_update(dt)
    local s = engine.state
    if engine.input.key_down("KeyW") then s.camera_y = 1 end
    if engine.input.key_down("KeyA") then s.camera_x = -1 end
    s.offset = engine.input.scroll_y()
    s.rotation = engine.input.mouse_x
    s.zoom = engine.input.mouse_y
end
"#,
        );

        let bridge = LuaBridge::new(path.clone());
        let mut input = held(&["KeyW"]);
        input.add_scroll(Vec2::new(0.0, -2.0));
        input.set_mouse_position(Vec2::new(3.0, 4.0));
        let next = bridge
            .call_update(0.016, &input, &DemoState::new())
            .expect("should return state");
        assert_eq!(next.camera.position, Vec2::new(0.0, 1.0));
        assert_eq!(next.offset, -2.0);
        assert_eq!(next.camera.rotation, 3.0);
        assert_eq!(next.camera.zoom, 4.0);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn script_sees_edges_and_mouse_buttons() {
        let path = temp_lua_path("edges");
        write_temp_script(
            &path,
            r#"
function on_update(dt)
    local s = engine.state
    local i = engine.input
    if i.key_pressed("Space") then s.offset = s.offset + 1 end
    if i.key_released("KeyR") then s.offset = s.offset + 10 end
    if i.mouse_down("Left") then s.camera_x = 5 end
    if i.mouse_pressed("Left") then s.camera_y = 7 end
    if i.mouse_released("Right") then s.zoom = 3 end
end
"#,
        );

        let bridge = LuaBridge::new(path.clone());
        let mut input = InputState::new();
        input.press("Space");
        input.press("KeyR");
        input.release("KeyR");
        input.press_button("Left");
        input.press_button("Right");
        input.release_button("Right");
        let next = bridge
            .call_update(0.016, &input, &DemoState::new())
            .expect("edge frame");
        assert_eq!(next.offset, 11.0);
        assert_eq!(next.camera.position, Vec2::new(5.0, 7.0));
        assert_eq!(next.camera.zoom, 3.0);

        // Edges are gone next frame; held state remains.
        input.end_frame();
        let next = bridge
            .call_update(0.016, &input, &DemoState::new())
            .expect("held frame");
        assert_eq!(next.offset, 0.0);
        assert_eq!(next.camera.position, Vec2::new(5.0, 0.0));
        assert_eq!(next.camera.zoom, 1.0);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn runtime_error_yields_none() {
        let path = temp_lua_path("runtime_error");
        write_temp_script(
            &path,
            r#"
function on_update(dt)
    engine.state.offset = {}
end
"#,
        );

        let bridge = LuaBridge::new(path.clone());
        assert_eq!(bridge.status(), LuaStatus::Loaded);
        assert!(bridge
            .call_update(0.016, &InputState::new(), &DemoState::new())
            .is_none());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn bridge_force_reload() {
        let path = temp_lua_path("reload");
        let _ = std::fs::remove_file(&path);
        let mut bridge = LuaBridge::new(path.clone());
        assert_eq!(bridge.status(), LuaStatus::Fallback);

        write_temp_script(&path, VALID_LUA_SCRIPT);
        bridge.force_reload();
        assert_eq!(
            bridge.status(),
            LuaStatus::Loaded,
            "After force_reload with valid script, status should be Loaded. Error: {:?}",
            bridge.last_error()
        );

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn check_reload_ignores_missing_file() {
        let mut bridge = LuaBridge::new(PathBuf::from("__nonexistent_reload_target__.lua"));
        bridge.check_reload();
        assert_eq!(bridge.status(), LuaStatus::Fallback);
    }

    #[test]
    fn shipped_script_matches_rust_basic_controls() {
        let bridge = LuaBridge::new(shipped_script());
        assert_eq!(
            bridge.status(),
            LuaStatus::Loaded,
            "shipped script failed: {:?}",
            bridge.last_error()
        );

        let scheme = ControlScheme::basic();
        let frames: Vec<(Vec<&str>, f32, f32)> = vec![
            (vec![], 0.0, 0.016),
            (vec!["ArrowUp"], 0.0, 0.016),
            (vec!["ArrowUp", "ArrowRight"], 0.0, 0.033),
            (vec!["ArrowDown", "ArrowUp"], 0.0, 0.020),
            (vec!["Minus"], 1.0, 0.016),
            (vec!["Equal", "ArrowLeft"], -3.0, 0.050),
            (vec!["ArrowDown"], 0.0, 1.0),
        ];

        let mut lua_state = DemoState::new();
        let mut rust_state = DemoState::new();
        for (step, (keys, scroll_y, dt)) in frames.iter().enumerate() {
            let mut input = held(keys);
            input.add_scroll(Vec2::new(0.0, *scroll_y));

            lua_state = bridge
                .call_update(*dt, &input, &lua_state)
                .expect("shipped script should not fail");
            scheme.step(&mut rust_state, &input, *dt);
            assert_eq!(lua_state, rust_state, "step {step}");
        }
    }
}
