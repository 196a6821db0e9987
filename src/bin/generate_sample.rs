use chrono::{Days, Local};

/// Minimal deterministic PRNG (xorshift64*)
struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        SimpleRng {
            state: seed.max(1),
        }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).sin();
        mean + std_dev * z
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }

    fn range_days(&mut self, max: u64) -> u64 {
        self.next_u64() % max
    }
}

fn main() {
    let mut rng = SimpleRng::new(42);
    let today = Local::now().date_naive();

    // (family name, base price, unit of measure)
    let families: [(&str, f64, &str); 10] = [
        ("Carbon Steel Pipe", 85.0, "M"),
        ("PVC Pipe Sch 40", 24.0, "M"),
        ("Gate Valve", 310.0, "EA"),
        ("Ball Valve", 180.0, "EA"),
        ("Pipe Elbow 90", 12.5, "EA"),
        ("Hex Bolt M16", 0.85, "EA"),
        ("Portland Cement", 18.0, "BAG"),
        ("Rebar 12mm", 42.0, "EA"),
        ("Copper Cable 4mm", 6.8, "ROLL"),
        ("Safety Helmet", 35.0, "EA"),
    ];
    let sizes = ["DN15", "DN25", "DN50", "DN80", "DN100", "DN150"];
    let orgs = ["1000", "2000", "3000"];

    let output_path = "sample_prices.csv";
    let mut writer = csv::Writer::from_path(output_path).expect("Failed to create output file");
    writer
        .write_record([
            "Material",
            "Material Name",
            "UOM",
            "Sales Org.",
            "Rawabi Price",
            "Market Price",
            "Valid From",
            "Valid To",
        ])
        .expect("Failed to write header");

    let mut row: u64 = 0;
    for &(family, base_price, uom) in &families {
        for (variant, &size) in sizes.iter().enumerate() {
            let id = format!("{:06}", 400_001 + row * 3);
            let name = format!("{family} {size}");
            let org = *rng.pick(&orgs);

            let price = base_price * (1.0 + variant as f64 * 0.45) * rng.gauss(1.0, 0.08);
            let market = price * rng.gauss(1.08, 0.10);

            // Validity spread around today so the expiry monitor has
            // expired rows, soon-to-expire rows, and safe rows.
            let valid_from = today - Days::new(30 + rng.range_days(360));
            let valid_to = if row % 5 == 0 {
                today + Days::new(rng.range_days(28))
            } else if row % 7 == 1 {
                today - Days::new(1 + rng.range_days(60))
            } else {
                today + Days::new(45 + rng.range_days(320))
            };

            // Leave occasional holes so the means and rankings have
            // missing values to skip over.
            let price_cell = if row % 19 == 7 {
                String::new()
            } else {
                format!("{price:.2}")
            };
            let market_cell = if row % 9 == 4 {
                String::new()
            } else {
                format!("{market:.2}")
            };
            let valid_from_cell = valid_from.format("%Y-%m-%d").to_string();
            let valid_to_cell = if row % 13 == 11 {
                String::new()
            } else {
                valid_to.format("%Y-%m-%d").to_string()
            };

            writer
                .write_record([
                    id.as_str(),
                    name.as_str(),
                    uom,
                    org,
                    price_cell.as_str(),
                    market_cell.as_str(),
                    valid_from_cell.as_str(),
                    valid_to_cell.as_str(),
                ])
                .expect("Failed to write row");
            row += 1;
        }
    }

    writer.flush().expect("Failed to flush output file");
    println!("Wrote {row} materials to {output_path}");
}
