use std::path::Path;

use crate::error::FootprintError;

pub const SAMPLE_FILE_NAME: &str = "sample_carbon_data.csv";

/// Canonical example upload. Byte-stable: used for downloads and fixtures.
pub const SAMPLE_CSV: &str = "Activity,Quantity,Unit,Date
Electricity Usage,1500,kWh,2023-01-15
Natural Gas,200,therm,2023-01-20
Gasoline Purchase,300,liter,2023-02-10
Flight - NYC to LON,11000,km,2023-03-05
Hotel Stay,5,night,2023-03-10
Office Waste,50,kg,2023-04-01
Water Consumption,20,m3,2023-04-05
Employee Commuting,2500,km,2023-05-01
Business Travel - Rail,800,km,2023-06-15
Refrigerant Leak,0.5,kg,2023-07-01
Cloud Services,500,hour_cpu,2023-08-01
Office Supplies,10,item_bundle,2023-09-01";

pub fn sample_csv() -> &'static str {
    SAMPLE_CSV
}

/// Write the sample into `dir` under [`SAMPLE_FILE_NAME`] and return its path.
pub fn write_sample(dir: impl AsRef<Path>) -> Result<std::path::PathBuf, FootprintError> {
    let path = dir.as_ref().join(SAMPLE_FILE_NAME);
    std::fs::write(&path, SAMPLE_CSV)?;
    Ok(path)
}
