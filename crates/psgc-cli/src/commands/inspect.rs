//! `psgc inspect` — classify one code and print its derived ancestors.

use psgc_core::code::{self, CodeShape, GeographicCode};

pub fn run(raw: &str) -> anyhow::Result<()> {
  let code = GeographicCode::normalize(raw)?;
  let shape = code::classify(&code)?;

  println!("code:    {code}");
  println!("shape:   {}", shape_name(shape));

  if shape > CodeShape::CityOrMunicipality {
    let parent = code::parent_code(&code, CodeShape::CityOrMunicipality)?;
    println!("city/municipality: {parent}");
  }
  if shape > CodeShape::Province {
    let province = code::parent_code(&code, CodeShape::Province)?;
    println!("province: {province}");
  }
  if shape > CodeShape::Region {
    let region = code::parent_code(&code, CodeShape::Region)?;
    println!("region:  {region}");
  }
  Ok(())
}

fn shape_name(shape: CodeShape) -> &'static str {
  match shape {
    CodeShape::Region => "region",
    CodeShape::Province => "province",
    CodeShape::CityOrMunicipality => {
      "city or municipality (name signals decide which)"
    }
    CodeShape::Barangay => "barangay",
  }
}
