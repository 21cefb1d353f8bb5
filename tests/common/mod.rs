//! Common test utilities for carepath integration tests.
//!
//! Provides `TestEnv` for isolated test environments that don't read the
//! user's `~/.config/carepath/` directory.

#![allow(dead_code)]

use assert_cmd::Command;
use std::path::{Path, PathBuf};
pub use tempfile::TempDir;

/// English sheet with two pathways.
pub const SAMPLE_CSV: &str = "\
pathway,phase,task,status,note
Cardiologia,A,1,Done,
Cardiologia,A,2,Ongoing,weekly
Cardiologia,B,1,Pending,
Cardiologia,B,2,In Progress,blocked on lab
Diabetes,A,1,Pending,
Diabetes,C,9,Done,
";

/// Portuguese sheet with an extra column.
pub const SAMPLE_PT_CSV: &str = "\
Linha de Cuidado,Fase,Tarefa,Status,Observações,Responsável
Saúde Mental,Acolhimento,1,Concluído,,Ana
Saúde Mental,Acolhimento,2,Ação Contínua,mensal,Ana
Saúde Mental,Seguimento,1,Pendente,,Bruno
";

/// A test environment with an isolated working and config directory.
///
/// `carepath()` runs the binary inside `work_dir` with `CAREPATH_CONFIG_DIR`
/// pointed at `config_dir`, so a user's system config never leaks in.
pub struct TestEnv {
    pub work_dir: TempDir,
    pub config_dir: TempDir,
}

impl TestEnv {
    /// Create a new test environment with isolated directories.
    pub fn new() -> Self {
        Self {
            work_dir: TempDir::new().unwrap(),
            config_dir: TempDir::new().unwrap(),
        }
    }

    /// Environment with `sheet.csv` holding `content`, named by the local carepath.kdl.
    pub fn with_sheet(content: &str) -> Self {
        let env = Self::new();
        env.write("sheet.csv", content);
        env.write("carepath.kdl", "data-file \"sheet.csv\"\n");
        env
    }

    /// Environment seeded with [`SAMPLE_CSV`].
    pub fn sample() -> Self {
        Self::with_sheet(SAMPLE_CSV)
    }

    /// Get a Command for the carepath binary inside this environment.
    pub fn carepath(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_carepath"));
        cmd.current_dir(self.work_dir.path());
        cmd.env("CAREPATH_CONFIG_DIR", self.config_dir.path());
        cmd.env_remove("CAREPATH_FILE");
        cmd.env_remove("CAREPATH_CONFIG");
        cmd.env_remove("CAREPATH_LOG");
        cmd
    }

    pub fn path(&self) -> &Path {
        self.work_dir.path()
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.work_dir.path().join(name)
    }

    pub fn write(&self, name: &str, content: &str) {
        std::fs::write(self.file(name), content).unwrap();
    }

    pub fn read(&self, name: &str) -> String {
        std::fs::read_to_string(self.file(name)).unwrap()
    }

    /// Parse stdout of a successful run as JSON.
    pub fn json(&self, args: &[&str]) -> serde_json::Value {
        let output = self.carepath().args(args).output().unwrap();
        assert!(
            output.status.success(),
            "carepath {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).unwrap()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
