use std::error::Error;

use chrono::{Duration, NaiveDate};

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

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }
}

fn cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

fn main() -> Result<(), Box<dyn Error>> {
    let mut rng = SimpleRng::new(7);

    let regions = ["Central", "East", "South", "West"];
    let segments = ["Consumer", "Corporate", "Home Office"];
    let catalog: &[(&str, &[&str])] = &[
        ("Furniture", &["Bookcases", "Chairs", "Tables", "Furnishings"]),
        (
            "Office Supplies",
            &["Appliances", "Art", "Binders", "Labels", "Paper", "Storage"],
        ),
        ("Technology", &["Accessories", "Copiers", "Machines", "Phones"]),
    ];
    let customers = [
        "Claire Gute",
        "Darrin Van Huff",
        "Sean O'Donnell",
        "Brosina Hoffman",
        "Andrew Allen",
        "Irene Maddox",
        "Harold Pawlan",
        "Pete Kriz",
        "Alejandro Grove",
        "Zuschuss Donatelli",
        "Ken Black",
        "Sandra Flanagan",
        "Emily Burns",
        "Eric Hoffmann",
        "Tracy Blumstein",
        "Matt Abelman",
    ];

    let output_path = "superstore.csv";
    let mut wtr = csv::Writer::from_path(output_path)?;

    // Loosely formatted headers on purpose: the loader normalizes them. The
    // trailing column mimics the stray artifact column seen in real exports.
    wtr.write_record([
        "Order ID",
        "Order Date",
        "Ship Date",
        "Region",
        "Segment",
        "Category",
        "Sub-Category",
        "Customer Name",
        "Sales",
        "Profit",
        "Unnamed: 21",
    ])?;

    let mut rows = 0usize;
    let mut order_seq = 100_000u64;

    while rows < 2000 {
        order_seq += 1;
        let year = 2020 + (rng.next_u64() % 4) as i32;
        let order_id = format!("US-{year}-{order_seq}");

        let month = 1 + (rng.next_u64() % 12) as u32;
        let day = 1 + (rng.next_u64() % 28) as u32;
        let order_date = NaiveDate::from_ymd_opt(year, month, day).unwrap();
        let ship_date = order_date + Duration::days(2 + (rng.next_u64() % 5) as i64);

        let region = *rng.pick(&regions);
        let segment = *rng.pick(&segments);
        let customer = *rng.pick(&customers);

        let order_date_s = order_date.to_string();
        let ship_date_s = ship_date.to_string();

        let line_items = 1 + (rng.next_u64() % 3) as usize;
        for _ in 0..line_items {
            let (category, subs) = *rng.pick(catalog);
            let sub_category = *rng.pick(subs);

            // Skewed toward small tickets, like real order data.
            let sales = cents(rng.next_f64().powi(3) * 2400.0 + 5.0);
            let margin = rng.next_f64() * 0.6 - 0.2;
            let profit = cents(sales * margin);
            let sales_s = format!("{sales:.2}");
            let profit_s = format!("{profit:.2}");

            wtr.write_record([
                order_id.as_str(),
                order_date_s.as_str(),
                ship_date_s.as_str(),
                region,
                segment,
                category,
                sub_category,
                customer,
                sales_s.as_str(),
                profit_s.as_str(),
                "",
            ])?;
            rows += 1;
        }
    }

    // A few malformed rows to exercise the cleaning rules: a bad date (row
    // kept, date unknown), a blank region and a non-numeric sales figure
    // (both rows dropped).
    wtr.write_record([
        "US-2023-999001",
        "not a date",
        "2023-05-10",
        "West",
        "Consumer",
        "Technology",
        "Phones",
        "Dana Teague",
        "199.99",
        "44.20",
        "",
    ])?;
    wtr.write_record([
        "US-2023-999002",
        "2023-04-02",
        "2023-04-06",
        "",
        "Consumer",
        "Furniture",
        "Chairs",
        "Gary Hwang",
        "80.00",
        "12.00",
        "",
    ])?;
    wtr.write_record([
        "US-2023-999003",
        "2023-04-03",
        "2023-04-07",
        "East",
        "Corporate",
        "Office Supplies",
        "Paper",
        "Rosa Fuentes",
        "n/a",
        "3.10",
        "",
    ])?;
    wtr.flush()?;

    println!("Wrote {} order lines to {output_path}", rows + 3);
    Ok(())
}
