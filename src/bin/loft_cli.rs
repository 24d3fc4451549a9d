#[cfg(target_arch = "wasm32")]
fn main() {
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(err) = native::run() {
        eprintln!("loft_cli error: {err}");
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use loft_engine::geom::{
        CrossSection, Face, LoftModel, LoftOptions, LoftStrategy, Point2,
    };
    use std::collections::HashMap;
    use std::fs::{self, File};
    use std::io::{BufWriter, Write};
    use std::path::{Path, PathBuf};

    const USAGE: &str = r#"loft_cli (loft-engine)

USAGE:
  loft_cli list
  loft_cli run <scenario|all> [options]
  loft_cli model <file.json> [options]

SCENARIOS:
  square_prism
  square_to_circle
  tapered_tower
  notched_anchor
  locked_twist

OPTIONS:
  --out-dir <dir>        Write <scenario>.obj to this dir (required for `run all`)
  --obj <path>           Write OBJ to this path (single scenario or model)
  --strategy <name>      perimeter-walk | anchor-resample (overrides the scenario default)
  --caps                 Close the bottom and top of the stack
  --overwrite            Overwrite existing output files
  -h, --help             Show this help
"#;

    pub fn run() -> Result<(), String> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let mut args = Args::new(args);

        let Some(command) = args.next() else {
            print_usage();
            return Ok(());
        };

        match command.as_str() {
            "list" => {
                print_scenarios();
                Ok(())
            }
            "run" => cmd_run(&mut args),
            "model" => cmd_model(&mut args),
            "-h" | "--help" | "help" => {
                print_usage();
                Ok(())
            }
            other => Err(format!("unknown command `{other}`\n\n{USAGE}")),
        }
    }

    fn print_usage() {
        println!("{USAGE}");
    }

    fn print_scenarios() {
        for scenario in Scenario::ALL {
            println!("{}", scenario.name());
        }
    }

    #[derive(Debug, Default)]
    struct OutputOptions {
        out_dir: Option<PathBuf>,
        obj_path: Option<PathBuf>,
        strategy: Option<LoftStrategy>,
        caps: bool,
        overwrite: bool,
    }

    impl OutputOptions {
        fn parse(args: &mut Args) -> Result<Option<Self>, String> {
            let mut options = Self::default();
            while let Some(arg) = args.next() {
                match arg.as_str() {
                    "--out-dir" => options.out_dir = Some(PathBuf::from(args.value("--out-dir")?)),
                    "--obj" => options.obj_path = Some(PathBuf::from(args.value("--obj")?)),
                    "--strategy" => {
                        let name = args.value("--strategy")?;
                        options.strategy = Some(name.parse().map_err(|e| format!("{e}"))?);
                    }
                    "--caps" => options.caps = true,
                    "--overwrite" => options.overwrite = true,
                    "-h" | "--help" => {
                        print_usage();
                        return Ok(None);
                    }
                    other => return Err(format!("unknown option `{other}`\n\n{USAGE}")),
                }
            }
            if options.out_dir.is_some() && options.obj_path.is_some() {
                return Err("use either --out-dir or --obj (not both)".to_string());
            }
            Ok(Some(options))
        }

        fn apply(&self, model: &mut LoftModel) {
            let mut loft = *model.options();
            if let Some(strategy) = self.strategy {
                loft.strategy = strategy;
            }
            if self.caps {
                loft.cap_bottom = true;
                loft.cap_top = true;
            }
            model.set_options(loft);
        }
    }

    fn cmd_run(args: &mut Args) -> Result<(), String> {
        let scenario_name = args.next().ok_or("missing scenario name")?;
        let Some(options) = OutputOptions::parse(args)? else {
            return Ok(());
        };

        if scenario_name == "all" {
            let dir = options
                .out_dir
                .as_deref()
                .ok_or("`run all` requires --out-dir")?;
            fs::create_dir_all(dir).map_err(|e| format!("create out dir: {e}"))?;
            for scenario in Scenario::ALL {
                let path = dir.join(format!("{}.obj", scenario.name()));
                run_scenario_to(*scenario, &options, Some(&path))?;
            }
            return Ok(());
        }

        let scenario = Scenario::from_name(&scenario_name).ok_or_else(|| unknown_scenario(&scenario_name))?;
        let path = match (&options.out_dir, &options.obj_path) {
            (Some(dir), _) => Some(dir.join(format!("{}.obj", scenario.name()))),
            (None, Some(path)) => Some(path.clone()),
            (None, None) => None,
        };
        run_scenario_to(scenario, &options, path.as_deref())
    }

    fn cmd_model(args: &mut Args) -> Result<(), String> {
        let input = PathBuf::from(args.next().ok_or("missing model file")?);
        let Some(options) = OutputOptions::parse(args)? else {
            return Ok(());
        };

        let json = fs::read_to_string(&input).map_err(|e| format!("read {}: {e}", input.display()))?;
        let mut model = LoftModel::from_json(&json, LoftOptions::default()).map_err(|e| e.to_string())?;
        options.apply(&mut model);
        // Loading replays locked segments; report only the lofting itself.
        model.reset_timing();

        let name = input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("model")
            .to_string();
        let path = match (&options.out_dir, &options.obj_path) {
            (Some(dir), _) => Some(dir.join(format!("{name}.obj"))),
            (None, Some(path)) => Some(path.clone()),
            (None, None) => None,
        };
        emit(&model, &name, path.as_deref(), options.overwrite)
    }

    fn run_scenario_to(scenario: Scenario, options: &OutputOptions, path: Option<&Path>) -> Result<(), String> {
        let mut model = scenario.build()?;
        options.apply(&mut model);
        emit(&model, scenario.name(), path, options.overwrite)
    }

    fn emit(model: &LoftModel, name: &str, path: Option<&Path>, overwrite: bool) -> Result<(), String> {
        let faces = model.faces();

        if let Some(path) = path {
            write_obj_file(path, &faces, name, overwrite)?;
            eprintln!("wrote {}", path.display());
        } else {
            let mut out = std::io::stdout().lock();
            write_obj(&mut out, &faces, name).map_err(|e| format!("write obj: {e}"))?;
        }

        let quads = faces.iter().filter(|f| f.is_quad()).count();
        let locked = (0..model.segment_count())
            .filter(|&i| model.is_segment_locked(i).unwrap_or(false))
            .count();
        eprintln!(
            "{name}: strategy={} sections={} segments={} locked={locked} faces={} quads={quads} triangles={}",
            model.options().strategy,
            model.section_count(),
            model.segment_count(),
            faces.len(),
            faces.len() - quads
        );
        if let Some(report) = model.timing() {
            eprintln!("{name}: {:.3} ms ({report:?})", report.total_ms());
        }
        Ok(())
    }

    fn unknown_scenario(name: &str) -> String {
        let mut msg = format!("unknown scenario `{name}`\n\navailable scenarios:\n");
        for scenario in Scenario::ALL {
            msg.push_str("  ");
            msg.push_str(scenario.name());
            msg.push('\n');
        }
        msg
    }

    fn write_obj_file(path: &Path, faces: &[Face], name: &str, overwrite: bool) -> Result<(), String> {
        if path.exists() && !overwrite {
            return Err(format!(
                "refusing to overwrite existing file {} (use --overwrite)",
                path.display()
            ));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| format!("create dir {}: {e}", parent.display()))?;
        }

        let file = File::create(path).map_err(|e| format!("create {}: {e}", path.display()))?;
        let mut w = BufWriter::new(file);
        write_obj(&mut w, faces, name).map_err(|e| format!("write obj: {e}"))?;
        w.flush().map_err(|e| format!("flush {}: {e}", path.display()))
    }

    /// Writes faces as OBJ, sharing vertices with identical coordinates.
    fn write_obj(w: &mut impl Write, faces: &[Face], name: &str) -> std::io::Result<()> {
        writeln!(w, "# loft-engine loft_cli")?;
        writeln!(w, "o {name}")?;

        let mut index_of: HashMap<[u64; 3], usize> = HashMap::new();
        let mut face_indices: Vec<Vec<usize>> = Vec::with_capacity(faces.len());
        for face in faces {
            let mut indices = Vec::with_capacity(face.len());
            for v in face.vertices() {
                let key = [v.x.to_bits(), v.y.to_bits(), v.z.to_bits()];
                let index = if let Some(&index) = index_of.get(&key) {
                    index
                } else {
                    // OBJ indices are 1-based.
                    let index = index_of.len() + 1;
                    index_of.insert(key, index);
                    writeln!(w, "v {} {} {}", v.x, v.y, v.z)?;
                    index
                };
                indices.push(index);
            }
            face_indices.push(indices);
        }

        for indices in face_indices {
            let list: Vec<String> = indices.iter().map(ToString::to_string).collect();
            writeln!(w, "f {}", list.join(" "))?;
        }
        Ok(())
    }

    #[derive(Debug, Clone, Copy)]
    enum Scenario {
        SquarePrism,
        SquareToCircle,
        TaperedTower,
        NotchedAnchor,
        LockedTwist,
    }

    impl Scenario {
        const ALL: &'static [Scenario] = &[
            Scenario::SquarePrism,
            Scenario::SquareToCircle,
            Scenario::TaperedTower,
            Scenario::NotchedAnchor,
            Scenario::LockedTwist,
        ];

        fn name(self) -> &'static str {
            match self {
                Scenario::SquarePrism => "square_prism",
                Scenario::SquareToCircle => "square_to_circle",
                Scenario::TaperedTower => "tapered_tower",
                Scenario::NotchedAnchor => "notched_anchor",
                Scenario::LockedTwist => "locked_twist",
            }
        }

        fn from_name(name: &str) -> Option<Self> {
            Self::ALL.iter().copied().find(|s| s.name() == name)
        }

        fn build(self) -> Result<LoftModel, String> {
            let mut model = match self {
                Scenario::NotchedAnchor => LoftModel::new(LoftOptions::anchor_resample()),
                Scenario::TaperedTower => LoftModel::new(LoftOptions::capped()),
                _ => LoftModel::default(),
            };

            match self {
                Scenario::SquarePrism => {
                    model.add_section(CrossSection::new(square(1.0), 0.0));
                    model.add_section(CrossSection::new(square(1.0), 2.0));
                }
                Scenario::SquareToCircle => {
                    model.add_section(CrossSection::new(square(1.0), 0.0));
                    model.add_section(CrossSection::new(circle(1.0, 24), 2.0));
                }
                Scenario::TaperedTower => {
                    model.add_section(CrossSection::new(square(2.0), 0.0));
                    model.add_section(CrossSection::new(circle(1.6, 16), 2.0));
                    model.add_section(CrossSection::new(circle(1.0, 7), 4.0));
                    model.add_section(CrossSection::new(square(0.5), 6.0));
                }
                Scenario::NotchedAnchor => {
                    let notched = vec![
                        Point2::new(-1.0, -1.0),
                        Point2::new(1.0, -1.0),
                        Point2::new(1.0, 1.0),
                        Point2::new(0.3, 1.0),
                        Point2::new(0.0, 0.4),
                        Point2::new(-0.3, 1.0),
                        Point2::new(-1.0, 1.0),
                    ];
                    model.add_section(CrossSection::new(square(1.0), 0.0));
                    model.add_section(CrossSection::new(notched, 1.5));
                    model.add_section(CrossSection::new(square(1.2), 3.0));
                }
                Scenario::LockedTwist => {
                    model.add_section(CrossSection::new(square(1.0), 0.0));
                    model.add_section(CrossSection::new(circle(1.2, 12), 2.0));
                    model.lock_segment(0).map_err(|e| e.to_string())?;

                    // Twist the top sketch; the locked band follows without re-triangulating.
                    let twisted: Vec<Point2> = circle(1.2, 12)
                        .into_iter()
                        .map(|p| rotate(p, 0.4))
                        .collect();
                    model.set_section_points(1, twisted).map_err(|e| e.to_string())?;
                }
            }
            Ok(model)
        }
    }

    fn square(h: f64) -> Vec<Point2> {
        vec![
            Point2::new(-h, -h),
            Point2::new(h, -h),
            Point2::new(h, h),
            Point2::new(-h, h),
        ]
    }

    fn circle(r: f64, n: usize) -> Vec<Point2> {
        (0..n)
            .map(|i| {
                let a = std::f64::consts::TAU * i as f64 / n as f64;
                Point2::new(r * a.cos(), r * a.sin())
            })
            .collect()
    }

    fn rotate(p: Point2, angle: f64) -> Point2 {
        let (s, c) = angle.sin_cos();
        Point2::new(p.x * c - p.y * s, p.x * s + p.y * c)
    }

    struct Args {
        args: Vec<String>,
        pos: usize,
    }

    impl Args {
        fn new(args: Vec<String>) -> Self {
            Self { args, pos: 0 }
        }

        fn next(&mut self) -> Option<String> {
            let arg = self.args.get(self.pos)?.clone();
            self.pos += 1;
            Some(arg)
        }

        fn value(&mut self, flag: &str) -> Result<String, String> {
            self.next()
                .ok_or_else(|| format!("missing value for {flag}"))
        }
    }
}
