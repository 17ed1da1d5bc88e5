use crate::job::script::Script;
use crate::job::{JobVariant, SynthesisContext};

/// Gaussian reads the input directly and writes a checkpoint next to the output.
pub struct Gaussian;

impl JobVariant for Gaussian {
    fn execute(&self, script: &mut Script, ctx: &SynthesisContext) -> Vec<String> {
        let config = ctx.config;
        script.line(format!(
            "{} {} > {}",
            ctx.environment.exe,
            config.input_file(),
            config.output_file()
        ));
        vec![
            config.output_file(),
            format!("{}.chk", config.identifier),
        ]
    }
}

#[cfg(test)]
mod tests {
    use crate::cluster::Cluster;
    use crate::job::{Job, JobKind};
    use crate::tests::utils::{config, registry};

    #[test]
    fn test_gaussian_invocation() {
        let registry = registry();
        let job = Job::new(
            config("h2o", Cluster::Fram),
            JobKind::Gaussian,
            vec![],
            vec![],
            &registry,
        )
        .unwrap();
        let body = job.body();
        assert!(body.contains(&"g16 h2o.inp > h2o.out".to_string()));
        assert!(body.contains(&"savefile h2o.chk".to_string()));
        assert_eq!(body.last().map(|s| s.as_str()), Some("exit 0"));
    }
}
