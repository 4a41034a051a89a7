#![allow(dead_code)]

use cms_reports::DuckDbExecutor;
use duckdb::Connection;

/// Population rows as CSV, matching the `cmspop` column order.
pub const POPULATION_CSV: &str = "\
id,state,sex,race,dob,dod,alz_rel_sen,heart_fail,chronic_kidney,cancer,depression
1,CA,male,1,1930-12-31,2000-01-01,false,false,false,true,false
2,CA,female,2,1920-03-15,2000-08-20,false,false,false,true,false
3,CA,male,1,1945-05-05,,false,false,false,true,false
4,NY,male,1,1940-07-04,2000-07-05,false,false,false,true,false
5,TX,male,5,1950-01-01,,false,false,false,true,false
6,TX,male,5,1952-01-01,,false,false,false,true,false
7,NY,female,2,1948-02-02,,false,false,false,true,false
8,FL,female,3,1950-06-06,2010-06-05,false,true,false,false,false
9,CA,female,4,1925-04-04,2000-09-09,false,false,false,true,false
";

pub const CLAIMS_CSV: &str = "\
id,carrier_reimb,bene_resp
1,100,10
2,300,30
4,50,40
7,150,10
";

/// Ages at death for cancer: CA 70 (a year-difference, not elapsed, age),
/// 75 and 80, NY 60. The CA death at 75 has no claim. TX has only living
/// male cases; FL only a heart_fail death with no claim.
pub fn seeded_connection() -> Connection {
    let dir = tempfile::tempdir().unwrap();
    let pop = dir.path().join("cmspop.csv");
    let claims = dir.path().join("cmsclaims.csv");
    std::fs::write(&pop, POPULATION_CSV).unwrap();
    std::fs::write(&claims, CLAIMS_CSV).unwrap();

    let conn = Connection::open_in_memory().unwrap();
    cms_reports::load::create_schema(&conn).unwrap();
    cms_reports::load::copy_csv(&conn, "cmspop", &pop).unwrap();
    cms_reports::load::copy_csv(&conn, "cmsclaims", &claims).unwrap();
    conn
}

pub fn seeded_executor() -> DuckDbExecutor {
    DuckDbExecutor::from_connection(seeded_connection())
}
