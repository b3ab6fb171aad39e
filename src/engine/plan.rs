// src/engine/plan.rs

//! Turns the `[build]` section plus run options into concrete stage
//! commands for a job.

use std::path::{Path, PathBuf};

use crate::config::model::BuildSection;
use crate::exec::command::StageCommand;
use crate::job::Job;

const VERSION_PLACEHOLDER: &str = "{version}";

/// Run-wide choices that change every build invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanOptions {
    /// Append `[build].quiet_args`.
    pub quiet: bool,
    /// Passed as `--settings <path>` to every invocation.
    pub settings_file: Option<PathBuf>,
}

/// The argument vectors for every stage of every job in a run.
///
/// Argument order for each invocation: stage arguments, common arguments,
/// then (build stage only) extra-repository arguments and the job's extra
/// arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPlan {
    program: String,
    version: String,
    common_args: Vec<String>,
    setup: Vec<Vec<String>>,
    main: Vec<String>,
    extra_repository_args: Vec<String>,
}

impl BuildPlan {
    pub fn new(build: &BuildSection, version: &str, options: &PlanOptions) -> Self {
        let mut common_args = build.common_args.clone();
        if options.quiet {
            common_args.extend(build.quiet_args.iter().cloned());
        }
        if let Some(ref settings) = options.settings_file {
            common_args.push("--settings".to_string());
            common_args.push(settings.display().to_string());
        }

        Self {
            program: build.program.clone(),
            version: version.to_string(),
            common_args,
            setup: build.setup.clone(),
            main: build.main.clone(),
            extra_repository_args: build.extra_repository_args.clone(),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Directory the stages of `job` run in.
    pub fn build_dir(&self, job: &Job, checkout: &Path) -> PathBuf {
        match job.build_subdir {
            Some(ref sub) => checkout.join(sub),
            None => checkout.to_path_buf(),
        }
    }

    /// Silent version-pin stages, in execution order.
    pub fn setup_stages(&self, dir: &Path) -> Vec<StageCommand> {
        self.setup
            .iter()
            .map(|args| {
                StageCommand::new(&self.program, dir)
                    .args(self.substitute(args))
                    .args(self.common_args.iter().cloned())
            })
            .collect()
    }

    /// The main build stage, streamed to the tail.
    pub fn build_stage(&self, job: &Job, dir: &Path) -> StageCommand {
        let mut stage = StageCommand::new(&self.program, dir)
            .args(self.substitute(&self.main))
            .args(self.common_args.iter().cloned());
        if job.extra_repository {
            stage = stage.args(self.extra_repository_args.iter().cloned());
        }
        stage.args(self.substitute(&job.extra_args))
    }

    fn substitute(&self, args: &[String]) -> Vec<String> {
        args.iter()
            .map(|a| a.replace(VERSION_PLACEHOLDER, &self.version))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_stages_pin_the_version() {
        let plan = BuildPlan::new(&BuildSection::default(), "25.1.0", &PlanOptions::default());
        let stages = plan.setup_stages(Path::new("/w/proj"));

        assert_eq!(stages.len(), 2);
        assert_eq!(
            stages[0].to_string(),
            "mvn versions:set-property -Dproperty=vaadin.version -DnewVersion=25.1.0 -DgenerateBackupPoms=false -B"
        );
        assert_eq!(stages[1].args[0], "versions:set");
        assert_eq!(stages[1].cwd, PathBuf::from("/w/proj"));
    }

    #[test]
    fn build_stage_orders_arguments() {
        let options = PlanOptions {
            quiet: true,
            settings_file: Some(PathBuf::from("/home/me/settings.xml")),
        };
        let plan = BuildPlan::new(&BuildSection::default(), "25.1.0", &options);
        let job = Job::builder("addon", "r")
            .extra_repository(true)
            .extra_arg("-DskipTests")
            .build();

        let stage = plan.build_stage(&job, Path::new("/w/addon"));
        assert_eq!(
            stage.to_string(),
            "mvn clean verify -B --no-transfer-progress --settings /home/me/settings.xml -Pvaadin-addons -DskipTests"
        );
    }

    #[test]
    fn build_dir_honours_subdirectory() {
        let plan = BuildPlan::new(&BuildSection::default(), "1", &PlanOptions::default());
        let job = Job::builder("super-fields", "r")
            .build_subdir("superfields")
            .build();
        assert_eq!(
            plan.build_dir(&job, Path::new("work/super-fields")),
            PathBuf::from("work/super-fields/superfields")
        );
    }
}
