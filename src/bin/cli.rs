use clap::Parser;
use hexmap::{GenerationReport, HexMapError, WorldGenerationParams, generate_world};
use std::path::PathBuf;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Генератор гексагональных карт мира
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Путь к конфигурационному файлу в формате TOML (по умолчанию: встроенные параметры)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Сид генерации (перекрывает значение из конфигурации)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Ширина карты в ячейках
    #[arg(long)]
    width: Option<u32>,

    /// Высота карты в ячейках
    #[arg(long)]
    height: Option<u32>,

    /// Путь для сохранения снимка карты в JSON
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Сгенерировать N миров с сидами подряд и вывести сводку по каждому
    #[arg(short, long)]
    batch: Option<u64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let mut params = match &cli.config {
        Some(path) => {
            println!("🔍 Загрузка конфигурации из {}...", path.display());
            WorldGenerationParams::from_toml_file(&path.to_string_lossy())?
        }
        None => WorldGenerationParams::default(),
    };
    if let Some(seed) = cli.seed {
        params.seed = Some(seed);
    }
    if let Some(width) = cli.width {
        params.width = width;
    }
    if let Some(height) = cli.height {
        params.height = height;
    }

    if let Some(count) = cli.batch {
        return run_batch(&params, count);
    }

    println!(
        "Генерация карты (размер: {}×{})...",
        params.width, params.height
    );
    let world = generate_world(&params)?;
    print_report(&world.report);

    if let Some(output) = &cli.output {
        println!("Сохранение снимка в {}", output.display());
        world.grid.snapshot().save(&output.to_string_lossy())?;
    }

    println!("\nГотово!");
    Ok(())
}

fn run_batch(params: &WorldGenerationParams, count: u64) -> Result<(), Box<dyn std::error::Error>> {
    let first_seed = params.seed.unwrap_or_else(rand::random);
    println!("Пакетная генерация: {count} миров начиная с сида {first_seed}");

    let generate = |offset: u64| -> Result<GenerationReport, HexMapError> {
        let params = WorldGenerationParams {
            seed: Some(first_seed.wrapping_add(offset)),
            ..params.clone()
        };
        generate_world(&params).map(|world| world.report)
    };

    #[cfg(feature = "parallel")]
    let reports: Vec<_> = (0..count).into_par_iter().map(generate).collect();
    #[cfg(not(feature = "parallel"))]
    let reports: Vec<_> = (0..count).map(generate).collect();

    for report in reports {
        print_report(&report?);
    }
    Ok(())
}

fn print_report(report: &GenerationReport) {
    println!(
        "сид {:>20}: суша {:>5} (недобор {}), участков {:>3}, реки {:>4} клеток (недобор {})",
        report.seed,
        report.land_cells,
        report.land_shortfall,
        report.landmasses,
        report.river_cells,
        report.river_shortfall
    );
}
