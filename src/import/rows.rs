use super::sheet::{cell, parse_date};
use crate::database::models::{
    Contact, DateRange, ProgramDetails, SchoolPatch, SocialMedia, StudentPatch, UniversityPatch,
};

/// One row of the university / study program sheet.
#[derive(Debug, Clone)]
pub struct ProgramRow {
    pub university_name: String,
    /// Everything but the name, which is the lookup key.
    pub university: UniversityPatch,
    pub program_name: String,
    /// `university` is filled in once the parent has been resolved.
    pub details: ProgramDetails,
}

impl ProgramRow {
    pub fn from_cells(row: &[String]) -> Self {
        let text = |i: usize| cell(row, i).to_string();

        let platform = text(11);
        let link = text(12);
        let social_media = if platform.is_empty() && link.is_empty() {
            Vec::new()
        } else {
            vec![SocialMedia { platform, link }]
        };

        let requirements = cell(row, 23)
            .split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(String::from)
            .collect();

        Self {
            university_name: text(2),
            university: UniversityPatch {
                alias: Some(text(3)),
                address: Some(text(4)),
                website: Some(text(5)),
                logo: Some(text(6)),
                image: Some(text(7)),
                contact: Some(Contact {
                    email: text(8),
                    phone: text(9),
                    fax: text(10),
                }),
                social_media: Some(social_media),
                ..Default::default()
            },
            program_name: text(13),
            details: ProgramDetails {
                university: None,
                program: text(14),
                program_type: text(15),
                ukt: text(16),
                spi: text(17),
                capacity: text(18),
                is_packet_c: cell(row, 19).eq_ignore_ascii_case("yes"),
                description: text(20),
                advantages: text(21),
                disadvantages: text(22),
                articles: Vec::new(),
                requirements,
                registration: DateRange {
                    start: parse_date(cell(row, 24)),
                    end: parse_date(cell(row, 25)),
                },
                exam: DateRange {
                    start: parse_date(cell(row, 26)),
                    end: parse_date(cell(row, 27)),
                },
                announcement: parse_date(cell(row, 28)),
            },
        }
    }
}

/// One row of the school / student sheet.
#[derive(Debug, Clone)]
pub struct StudentRow {
    pub school_name: String,
    pub school: SchoolPatch,
    /// `school_id` is filled in once the school has been resolved.
    pub student: StudentPatch,
}

impl StudentRow {
    pub fn from_cells(row: &[String]) -> Self {
        let text = |i: usize| Some(cell(row, i).to_string());
        let upper = |i: usize| Some(cell(row, i).to_uppercase());

        Self {
            school_name: cell(row, 3).to_string(),
            school: SchoolPatch {
                address: text(4),
                province: upper(5),
                city: upper(6),
                school_logo: text(7),
                school_image: text(8),
                phone: text(9),
                updated_at: None,
            },
            student: StudentPatch {
                name: text(1),
                email: text(2),
                school: upper(3),
                interest: text(10),
                gender: upper(11),
                phone: text(12),
                financial_ability: text(13),
                progress: text(14),
                image: text(15),
                category: text(16),
                birthdate: text(17),
                ..Default::default()
            },
        }
    }

    pub fn student_name(&self) -> &str {
        self.student.name.as_deref().unwrap_or("")
    }

    pub fn student_phone(&self) -> &str {
        self.student.phone.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn row(values: &[(usize, &str)]) -> Vec<String> {
        let mut cells = vec![String::new(); 30];
        for (i, v) in values {
            cells[*i] = v.to_string();
        }
        cells
    }

    #[test]
    fn program_row_maps_columns() {
        let cells = row(&[
            (2, "Institut Teknologi Bandung"),
            (3, "ITB"),
            (8, "info@itb.ac.id"),
            (13, "Teknik Informatika"),
            (14, "S1"),
            (19, "yes"),
            (23, "Matematika, Fisika,"),
            (24, "03-01-24"),
        ]);
        let parsed = ProgramRow::from_cells(&cells);

        assert_eq!(parsed.university_name, "Institut Teknologi Bandung");
        assert_eq!(parsed.university.alias.as_deref(), Some("ITB"));
        assert_eq!(parsed.university.contact.unwrap().email, "info@itb.ac.id");
        assert!(parsed.university.social_media.unwrap().is_empty());
        assert_eq!(parsed.program_name, "Teknik Informatika");
        assert!(parsed.details.is_packet_c);
        assert_eq!(parsed.details.requirements, vec!["Matematika", "Fisika"]);
        assert_eq!(parsed.details.registration.start.month(), 3);
        assert_eq!(parsed.details.exam.start.timestamp(), 0);
    }

    #[test]
    fn student_row_upper_cases_school_fields() {
        let cells = row(&[
            (1, "Ayu"),
            (3, "Sma 1 Bandung"),
            (5, "jawa barat"),
            (11, "f"),
            (12, "0812"),
        ]);
        let parsed = StudentRow::from_cells(&cells);

        assert_eq!(parsed.school_name, "Sma 1 Bandung");
        assert_eq!(parsed.school.province.as_deref(), Some("JAWA BARAT"));
        assert_eq!(parsed.student.school.as_deref(), Some("SMA 1 BANDUNG"));
        assert_eq!(parsed.student.gender.as_deref(), Some("F"));
        assert_eq!(parsed.student_name(), "Ayu");
        assert_eq!(parsed.student_phone(), "0812");
    }

    #[test]
    fn short_rows_do_not_panic() {
        let parsed = StudentRow::from_cells(&["1".to_string(), "Ayu".to_string()]);
        assert_eq!(parsed.student_name(), "Ayu");
        assert_eq!(parsed.school_name, "");
    }
}
