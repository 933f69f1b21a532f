use argh::FromArgs;
use std::sync::LazyLock;

/// Process wide switches for the material compiler
#[derive(Debug, Default, FromArgs)]
pub struct FabricArgs {
    /// fail material construction when a declared uniform, channel selector or
    /// sub-material is never referenced by the shader text
    #[argh(switch, hidden_help)]
    pub fabric_strict: bool,
    /// log every compiled top-level shader source at debug level
    #[argh(switch, hidden_help)]
    pub dump_shaders: bool,
}

impl FabricArgs {
    fn init() -> Option<FabricArgs> {
        let mut args = std::env::args();
        let cmd_name = args.next()?;
        let args: Vec<String> = args.collect();
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        FabricArgs::from_args(&[&cmd_name], &args).ok()
    }

    pub fn get() -> &'static FabricArgs {
        static INSTANCE: LazyLock<FabricArgs> =
            LazyLock::new(|| FabricArgs::init().unwrap_or_default());
        &INSTANCE
    }

    pub fn strict_by_default() -> bool {
        FabricArgs::get().fabric_strict
    }
}
