use anyhow::{Context, Result};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }

    fn range(&mut self, lo: i64, hi: i64) -> i64 {
        lo + (self.next_u64() % (hi - lo) as u64) as i64
    }
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let genders = ["Male", "Female", "Other"];
    let educations = [
        "Bachelor's",
        "Bachelor's Degree",
        "Master's",
        "Master's Degree",
        "PhD",
        "phD",
        "High School",
        "",
    ];
    let titles = [
        "Software Engineer",
        "Data Analyst",
        "  Data Analyst ",
        "Senior Manager",
        "Juniour HR Coordinator",
        "Sales Associate",
        "Marketing Coordinator",
    ];

    let mut buf = Vec::new();
    {
        let mut writer = csv::Writer::from_writer(&mut buf);
        writer.write_record([
            "Age",
            "Gender",
            "Education Level",
            "Job Title",
            "Years of Experience",
            "Salary",
        ])?;

        for i in 0..500 {
            let age = rng.range(18, 66);
            let max_exp = age - 16;
            let exp = rng.range(0, max_exp.max(1));
            let salary = 25_000 + exp * 4_000 + rng.range(0, 30_000);

            // Sprinkle in the defects the cleaner exists for.
            let (exp_cell, salary_cell) = match i % 25 {
                0 => (format!("{}", max_exp + 3), format!("{salary}.0")),
                1 => (String::new(), "500".to_string()),
                2 => (format!("{exp}.0"), String::new()),
                _ => (exp.to_string(), salary.to_string()),
            };

            writer.write_record([
                format!("{age}.0"),
                rng.pick(&genders).to_string(),
                rng.pick(&educations).to_string(),
                rng.pick(&titles).to_string(),
                exp_cell,
                salary_cell,
            ])?;
        }
        writer.flush()?;
    }

    // Prepend a BOM so the header-artifact handling gets exercised too.
    let output_path = "sample_salaries.csv";
    let mut bytes = Vec::with_capacity(buf.len() + 3);
    bytes.extend_from_slice("\u{feff}".as_bytes());
    bytes.extend_from_slice(&buf);
    std::fs::write(output_path, bytes).context("writing sample file")?;

    println!("Wrote 500 rows to {output_path}");
    Ok(())
}
