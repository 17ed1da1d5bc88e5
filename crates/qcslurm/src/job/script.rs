use crate::common::env::SCRATCH;

/// Ordered statements of a job script body.
#[derive(Default)]
pub(super) struct Script {
    lines: Vec<String>,
}

impl Script {
    pub fn line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn blank(&mut self) {
        self.lines.push(String::new());
    }

    pub fn export(&mut self, name: &str, value: impl AsRef<str>) {
        self.line(format!("export {name}={}", value.as_ref()));
    }

    pub fn load_modules(&mut self, modules: &[String]) {
        self.line("module purge");
        for module in modules {
            self.line(format!("module load {module}"));
        }
        self.blank();
    }

    pub fn copy_to_scratch(&mut self, file: &str) {
        self.line(format!("cp {file} {SCRATCH}"));
    }

    pub fn enter_scratch(&mut self) {
        self.line(format!("cd {SCRATCH}"));
    }

    /// `savefile` is picked up by the cluster epilogue, which copies the file back
    /// to the submission directory.
    pub fn save_file(&mut self, file: &str) {
        self.line(format!("savefile {file}"));
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}
