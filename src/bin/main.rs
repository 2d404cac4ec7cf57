//! CubeBlock Export CLI
//!
//! Extract mount points from scene files and merge block definitions into a
//! CubeBlocks catalog.

use clap::{Parser, Subcommand, ValueEnum};
use cubeblock_export::{
    block_bounds, load_scene, mount_point_definitions, mount_point_skeleton, mount_points_xml,
    AsAuthored, BlockConfig, BlockDefinition, BlockSize, CubeBlocksMerger, Document,
    MergeOptions,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "cubeblock-export")]
#[command(author, version, about = "Mount points and CubeBlocks definitions for modelled blocks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Project MountPoint polygons of a scene and print them
    MountPoints {
        /// JSON file with the scene's mesh objects
        #[arg(short, long)]
        scene: PathBuf,

        /// Grid size the block is modelled for
        #[arg(long, value_enum, default_value = "large")]
        size: SizeArg,

        /// Block dimensions in grid cells as x,y,z (z up)
        #[arg(long, value_parser = parse_dims, default_value = "1,1,1")]
        dims: [u32; 3],

        /// Print JSON instead of XML
        #[arg(long)]
        json: bool,
    },

    /// Print a scene with one mount-point quad per block side, as JSON
    Skeleton {
        #[arg(long, value_enum, default_value = "large")]
        size: SizeArg,

        #[arg(long, value_parser = parse_dims, default_value = "1,1,1")]
        dims: [u32; 3],
    },

    /// Merge definition fragments into a CubeBlocks catalog
    Merge {
        /// Catalog file to update
        #[arg(short, long)]
        catalog: PathBuf,

        /// Definition fragments (.xml, or .json block definitions)
        #[arg(short, long, required = true)]
        definition: Vec<PathBuf>,

        /// Match records by BlockPairName and CubeSize when the SubtypeId is unknown
        #[arg(long)]
        allow_rename: bool,

        /// Do not keep the previous catalog as <catalog>.bak
        #[arg(long)]
        no_backup: bool,

        /// Print the merged catalog instead of writing it
        #[arg(long)]
        dry_run: bool,
    },

    /// Render a JSON block definition as XML
    Definition {
        /// JSON file containing the block definition
        #[arg(short, long)]
        input: PathBuf,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum SizeArg {
    Large,
    Small,
}

impl From<SizeArg> for BlockSize {
    fn from(size: SizeArg) -> Self {
        match size {
            SizeArg::Large => BlockSize::Large,
            SizeArg::Small => BlockSize::Small,
        }
    }
}

fn parse_dims(s: &str) -> Result<[u32; 3], String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [x, y, z] = parts.as_slice() else {
        return Err(format!("Invalid dimensions: '{}'. Use x,y,z", s));
    };
    let parse = |p: &str| {
        p.parse::<u32>()
            .map_err(|e| format!("Invalid dimension '{}': {}", p, e))
    };
    Ok([parse(*x)?, parse(*y)?, parse(*z)?])
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::MountPoints {
            scene,
            size,
            dims,
            json,
        } => {
            let config = BlockConfig::new(size.into()).with_dimensions(dims);
            print_mount_points(&scene, &config, json)?;
        }
        Commands::Skeleton { size, dims } => {
            let config = BlockConfig::new(size.into()).with_dimensions(dims);
            config.validate()?;
            let skeleton = mount_point_skeleton(&config);
            println!("{}", serde_json::to_string_pretty(&[skeleton])?);
        }
        Commands::Merge {
            catalog,
            definition,
            allow_rename,
            no_backup,
            dry_run,
        } => {
            let options = MergeOptions {
                backup: !no_backup,
                allow_renames: allow_rename,
                ..MergeOptions::default()
            };
            merge_definitions(&catalog, &definition, options, dry_run)?;
        }
        Commands::Definition { input } => {
            let mut doc = load_definition(&input)?;
            let root = doc.root();
            doc.pretty(root, "\t");
            print!("{}", doc.to_xml_string());
        }
    }

    Ok(())
}

fn print_mount_points(
    scene_path: &Path,
    config: &BlockConfig,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    config.validate()?;
    let objects = load_scene(scene_path)?;
    log::info!("Loaded {} objects from {:?}", objects.len(), scene_path);

    let mount_points =
        mount_point_definitions(&objects, &AsAuthored, &block_bounds(config), config.size)?;
    log::info!("Found {} mount points", mount_points.len());

    if json {
        println!("{}", serde_json::to_string_pretty(&mount_points)?);
    } else {
        let mut doc = mount_points_xml(&mount_points);
        let root = doc.root();
        doc.pretty(root, "\t");
        print!("{}", doc.to_xml_string());
    }
    Ok(())
}

/// Read a definition fragment, rendering JSON block definitions to XML.
fn load_definition(path: &Path) -> Result<Document, Box<dyn std::error::Error>> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        let definition: BlockDefinition = serde_json::from_str(&fs::read_to_string(path)?)?;
        Ok(definition.to_xml()?)
    } else {
        Ok(Document::load(path)?)
    }
}

fn merge_definitions(
    catalog: &Path,
    definitions: &[PathBuf],
    options: MergeOptions,
    dry_run: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut merger = CubeBlocksMerger::open(catalog, options)?;

    let candidates = definitions
        .iter()
        .map(|path| load_definition(path))
        .collect::<Result<Vec<_>, _>>()?;
    let report = merger.merge_all(&candidates)?;

    log::info!(
        "{} merged, {} renamed, {} not found",
        report.merged.len(),
        report.renamed.len(),
        report.not_found.len()
    );

    if dry_run {
        print!("{}", merger.document().to_xml_string());
    } else {
        merger.write()?;
        log::info!("Wrote {:?}", catalog);
    }

    if !report.is_success() {
        return Err(format!(
            "no definition in the catalog for SubtypeId(s): {}",
            report.not_found.join(", ")
        )
        .into());
    }
    Ok(())
}
