pub mod admin;
pub mod knowledge_base;
pub mod school;
pub mod student;
pub mod study_program;
pub mod university;

pub use admin::{Admin, TokenRecord};
pub use knowledge_base::{KnowledgeBase, KnowledgeBasePatch, KnowledgeProgram};
pub use school::{School, SchoolPatch};
pub use student::{NewTrackRecord, Student, StudentPatch, TrackLobby, TrackRecord};
pub use study_program::{Article, DateRange, ProgramDetails, StudyProgram, StudyProgramPatch};
pub use university::{Contact, SocialMedia, University, UniversityPatch};

/// Collection names shared by the MongoDB store and the index bootstrap.
pub mod collections {
    pub const ADMINS: &str = "tb_admins";
    pub const TOKENS: &str = "tb_tokens";
    // existing deployments use this spelling
    pub const TOKEN_HISTORY: &str = "tb_hitory_tokens";
    pub const SCHOOLS: &str = "tb_schools";
    pub const STUDENTS: &str = "tb_students";
    pub const UNIVERSITIES: &str = "tb_universities";
    pub const STUDY_PROGRAMS: &str = "tb_study_programs";
    pub const KNOWLEDGE_BASES: &str = "tb_knowledge_bases";
}
