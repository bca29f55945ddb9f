//! Image commands: crop, resize, rotate, blur, rect, fill, circle, line,
//! arrow, info.
//!
//! Each command runs on a blocking thread with the tools bound to the
//! configuration snapshot taken at startup.

use clap::{Args, Subcommand};
use serde_json::json;
use sorcery_core::config::Interpolation;
use sorcery_core::imaging::{
    parse_color, parse_point, parse_segment, BlurArea, CircleSpec, FillArea, LineSpec,
    RectangleSpec, ResizeRequest,
};
use sorcery_core::{ActionStatus, Area, ImageTools, TelemetryGate};
use std::path::PathBuf;

use super::{print_json, Context};

/// Image subcommands.
#[derive(Subcommand, Debug)]
pub enum ImageCommand {
    /// Cut a rectangle out of an image
    Crop(CropArgs),

    /// Resize by width, height, or scale factor
    Resize(ResizeArgs),

    /// Rotate by a multiple of 90 degrees (positive is counter-clockwise)
    Rotate(RotateArgs),

    /// Blur rectangular areas
    Blur(BlurArgs),

    /// Draw rectangles
    Rect(RectArgs),

    /// Fill rectangular areas with a colour or transparency
    Fill(FillArgs),

    /// Draw a circle
    Circle(CircleArgs),

    /// Draw straight lines
    Line(LineArgs),

    /// Draw arrows pointing at the segment end
    Arrow(ArrowArgs),

    /// Show dimensions, format, and file size
    Info(InfoArgs),
}

/// Input and output shared by every writing command.
#[derive(Args, Debug)]
pub struct InputOutput {
    /// Image file to read
    pub input: PathBuf,

    /// Output file (defaults to `<stem>_<operation>.<ext>` next to the input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct CropArgs {
    #[command(flatten)]
    pub io: InputOutput,

    /// Area as x1,y1,x2,y2
    #[arg(long)]
    pub area: Area,
}

#[derive(Args, Debug)]
pub struct ResizeArgs {
    #[command(flatten)]
    pub io: InputOutput,

    #[arg(long)]
    pub width: Option<u32>,

    #[arg(long)]
    pub height: Option<u32>,

    /// Scale both sides by this factor (wins over width/height)
    #[arg(long)]
    pub scale: Option<f64>,

    /// nearest, linear, area, cubic, or lanczos (defaults to `resize.interpolation`)
    #[arg(long)]
    pub interpolation: Option<Interpolation>,
}

#[derive(Args, Debug)]
pub struct RotateArgs {
    #[command(flatten)]
    pub io: InputOutput,

    /// Angle in degrees
    #[arg(long, allow_hyphen_values = true)]
    pub angle: f64,
}

#[derive(Args, Debug)]
pub struct BlurArgs {
    #[command(flatten)]
    pub io: InputOutput,

    /// Area as x1,y1,x2,y2 (repeatable)
    #[arg(long = "area", required = true)]
    pub areas: Vec<Area>,

    /// Kernel size, odd (defaults to `blur.strength`)
    #[arg(long)]
    pub strength: Option<u32>,
}

#[derive(Args, Debug)]
pub struct RectArgs {
    #[command(flatten)]
    pub io: InputOutput,

    /// Area as x1,y1,x2,y2 (repeatable)
    #[arg(long = "area", required = true)]
    pub areas: Vec<Area>,

    /// Colour as b,g,r (defaults to `drawing.color`)
    #[arg(long, value_parser = parse_color)]
    pub color: Option<[u8; 3]>,

    /// Line thickness (defaults to `drawing.thickness`)
    #[arg(long)]
    pub thickness: Option<u32>,

    /// Fill the rectangles instead of outlining them
    #[arg(long)]
    pub filled: bool,
}

#[derive(Args, Debug)]
pub struct FillArgs {
    #[command(flatten)]
    pub io: InputOutput,

    /// Area as x1,y1,x2,y2 (repeatable)
    #[arg(long = "area", required = true)]
    pub areas: Vec<Area>,

    /// Colour as b,g,r (defaults to `drawing.color`)
    #[arg(long, value_parser = parse_color, conflicts_with = "transparent")]
    pub color: Option<[u8; 3]>,

    /// Blend factor between 0 and 1
    #[arg(long)]
    pub opacity: Option<f32>,

    /// Clear the areas to transparency
    #[arg(long)]
    pub transparent: bool,

    /// Fill everything outside the areas instead
    #[arg(long)]
    pub invert: bool,
}

#[derive(Args, Debug)]
pub struct CircleArgs {
    #[command(flatten)]
    pub io: InputOutput,

    /// Centre as x,y
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    pub center: (i32, i32),

    #[arg(long)]
    pub radius: u32,

    /// Colour as b,g,r (defaults to `drawing.color`)
    #[arg(long, value_parser = parse_color)]
    pub color: Option<[u8; 3]>,

    /// Line thickness (defaults to `drawing.thickness`)
    #[arg(long)]
    pub thickness: Option<u32>,

    #[arg(long)]
    pub filled: bool,
}

#[derive(Args, Debug)]
pub struct LineArgs {
    #[command(flatten)]
    pub io: InputOutput,

    /// Segment as x1,y1,x2,y2 (repeatable)
    #[arg(long = "segment", required = true, value_parser = parse_segment, allow_hyphen_values = true)]
    pub segments: Vec<LineSpec>,

    /// Colour as b,g,r (defaults to `drawing.color`)
    #[arg(long, value_parser = parse_color)]
    pub color: Option<[u8; 3]>,

    /// Line thickness (defaults to `drawing.thickness`)
    #[arg(long)]
    pub thickness: Option<u32>,
}

#[derive(Args, Debug)]
pub struct ArrowArgs {
    #[command(flatten)]
    pub line: LineArgs,

    /// Head length as a fraction of the arrow length
    #[arg(long)]
    pub tip_length: Option<f64>,
}

impl LineArgs {
    fn specs(&self, tip_length: Option<f64>) -> Vec<LineSpec> {
        self.segments
            .iter()
            .map(|segment| LineSpec {
                color: self.color,
                thickness: self.thickness,
                tip_length,
                ..*segment
            })
            .collect()
    }
}

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Image file to inspect
    pub input: PathBuf,
}

impl ImageCommand {
    fn name(&self) -> &'static str {
        match self {
            Self::Crop(_) => "crop",
            Self::Resize(_) => "resize",
            Self::Rotate(_) => "rotate",
            Self::Blur(_) => "blur",
            Self::Rect(_) => "draw_rectangles",
            Self::Fill(_) => "fill",
            Self::Circle(_) => "draw_circles",
            Self::Line(_) => "draw_lines",
            Self::Arrow(_) => "draw_arrows",
            Self::Info(_) => "metainfo",
        }
    }

    fn run(self, tools: &ImageTools) -> anyhow::Result<serde_json::Value> {
        let output = match self {
            Self::Crop(args) => tools.crop(&args.io.input, args.area, args.io.output.as_deref())?,
            Self::Resize(args) => {
                let request = ResizeRequest {
                    width: args.width,
                    height: args.height,
                    scale_factor: args.scale,
                    interpolation: args.interpolation,
                };
                tools.resize(&args.io.input, request, args.io.output.as_deref())?
            }
            Self::Rotate(args) => {
                tools.rotate(&args.io.input, args.angle, args.io.output.as_deref())?
            }
            Self::Blur(args) => {
                let areas: Vec<BlurArea> = args
                    .areas
                    .into_iter()
                    .map(|area| BlurArea {
                        area,
                        strength: args.strength,
                    })
                    .collect();
                tools.blur(&args.io.input, &areas, args.io.output.as_deref())?
            }
            Self::Rect(args) => {
                let rectangles: Vec<RectangleSpec> = args
                    .areas
                    .into_iter()
                    .map(|area| RectangleSpec {
                        area,
                        color: args.color,
                        thickness: args.thickness,
                        filled: args.filled,
                    })
                    .collect();
                tools.draw_rectangles(&args.io.input, &rectangles, args.io.output.as_deref())?
            }
            Self::Fill(args) => {
                let areas: Vec<FillArea> = args
                    .areas
                    .into_iter()
                    .map(|area| FillArea {
                        area,
                        color: args.color,
                        opacity: args.opacity,
                        transparent: args.transparent,
                    })
                    .collect();
                tools.fill(
                    &args.io.input,
                    &areas,
                    args.invert,
                    args.io.output.as_deref(),
                )?
            }
            Self::Circle(args) => {
                let circle = CircleSpec {
                    color: args.color,
                    thickness: args.thickness,
                    filled: args.filled,
                    ..CircleSpec::new(args.center, args.radius)
                };
                tools.draw_circles(&args.io.input, &[circle], args.io.output.as_deref())?
            }
            Self::Line(args) => {
                tools.draw_lines(&args.io.input, &args.specs(None), args.io.output.as_deref())?
            }
            Self::Arrow(args) => {
                let arrows = args.line.specs(args.tip_length);
                tools.draw_arrows(&args.line.io.input, &arrows, args.line.io.output.as_deref())?
            }
            Self::Info(args) => {
                return Ok(serde_json::to_value(tools.metainfo(&args.input)?)?);
            }
        };
        Ok(json!({ "output": output }))
    }
}

/// Execute an image command.
pub async fn execute(command: ImageCommand, context: &Context) -> anyhow::Result<()> {
    let config = context.manager()?.config();
    let tools = ImageTools::new(&config);
    let telemetry = TelemetryGate::from_config(&config, context.config_path().parent());

    let name = command.name();
    let result = tokio::task::spawn_blocking(move || command.run(&tools)).await?;

    match result {
        Ok(mut value) => {
            telemetry.record("tool_call", name, ActionStatus::Success);
            if let Some(object) = value.as_object_mut() {
                object.insert("operation".into(), json!(name));
            }
            print_json(&value)
        }
        Err(e) => {
            telemetry.record("tool_call", name, ActionStatus::Failed);
            Err(e)
        }
    }
}
