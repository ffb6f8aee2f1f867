use std::sync::LazyLock;

use crate::models::{Branch, LessonId, Subject, SubjectType};

pub struct SubjectDef {
    pub id: SubjectType,
    pub color: &'static str,
    pub description: &'static str,
    pub branches: &'static [&'static str],
    pub lessons_per_branch: u32,
}

/// Lessons listed on a branch page; the rest of `total_lessons` is not shown.
pub const VISIBLE_LESSONS: u32 = 10;

pub const SUBJECT_DATA: &[SubjectDef] = &[
    SubjectDef {
        id: SubjectType::Biology,
        color: "bg-emerald-500",
        description: "Explore the science of life, from cells to ecosystems.",
        branches: &[
            "Cell Biology", "Molecular Biology", "Genetics", "Microbiology",
            "Anatomy & Physiology", "Botany", "Zoology", "Ecology",
            "Evolutionary Biology", "Biochemistry",
        ],
        lessons_per_branch: 100,
    },
    SubjectDef {
        id: SubjectType::Chemistry,
        color: "bg-blue-500",
        description: "Understand matter, reactions, and the building blocks of the universe.",
        branches: &[
            "Organic Chemistry", "Inorganic Chemistry", "Physical Chemistry",
            "Analytical Chemistry", "Biochemistry", "Environmental Chemistry",
            "Nuclear Chemistry", "Industrial Chemistry", "Polymer Chemistry",
            "Theoretical Chemistry",
        ],
        lessons_per_branch: 100,
    },
    SubjectDef {
        id: SubjectType::Mathematics,
        color: "bg-red-500",
        description: "Master the language of logic, numbers, and space.",
        branches: &[
            "Algebra", "Geometry", "Calculus", "Statistics & Probability", "Number Theory",
        ],
        lessons_per_branch: 200,
    },
    SubjectDef {
        id: SubjectType::Physics,
        color: "bg-violet-500",
        description: "Unravel the laws of motion, energy, and the fabric of reality.",
        branches: &[
            "Classical Mechanics", "Electromagnetism", "Thermodynamics",
            "Quantum Physics", "Nuclear Physics", "Optics", "Fluid Mechanics",
            "Relativity", "Astrophysics", "Particle Physics",
        ],
        lessons_per_branch: 100,
    },
    SubjectDef {
        id: SubjectType::Astronomy,
        color: "bg-indigo-900",
        description: "Journey through the cosmos, stars, and galaxies.",
        branches: &[
            "Planetary Science", "Stellar Astronomy", "Galactic Astronomy",
            "Cosmology", "Astrobiology", "Observational Astronomy",
            "Radio Astronomy", "High-Energy Astronomy", "Space Exploration",
            "Infrared/Optical Astronomy",
        ],
        lessons_per_branch: 100,
    },
];

static CATALOG: LazyLock<Vec<Subject>> = LazyLock::new(|| SUBJECT_DATA.iter().map(build_subject).collect());

/// Whitespace runs become a single '-', then upper-cased.
pub fn branch_id(prefix: &str, name: &str) -> String {
    let slug = name.split_whitespace().collect::<Vec<_>>().join("-");
    format!("{}-{}", prefix, slug.to_uppercase())
}

fn build_subject(def: &SubjectDef) -> Subject {
    let prefix = def.id.prefix();
    let branches = def
        .branches
        .iter()
        .map(|name| Branch {
            id: branch_id(prefix, name),
            name: name.to_string(),
            description: format!("Comprehensive study of {}", name),
            total_lessons: def.lessons_per_branch,
        })
        .collect();

    Subject {
        id: def.id,
        name: def.id.name().to_string(),
        icon: def.id.icon(),
        color: def.color.to_string(),
        description: def.description.to_string(),
        branches,
    }
}

pub fn catalog() -> &'static [Subject] {
    &CATALOG
}

pub fn find_subject(id: SubjectType) -> Option<&'static Subject> {
    catalog().iter().find(|s| s.id == id)
}

pub fn find_branch<'a>(subject: &'a Subject, branch_id: &str) -> Option<&'a Branch> {
    subject.branches.iter().find(|b| b.id == branch_id)
}

#[derive(Debug, Clone, PartialEq)]
pub struct LessonEntry {
    pub number: u32,
    pub title: String,
    pub lesson_id: LessonId,
}

pub fn lesson_outline(branch: &Branch) -> Vec<LessonEntry> {
    (1..=VISIBLE_LESSONS.min(branch.total_lessons))
        .map(|n| LessonEntry {
            number: n,
            title: format!("{} - Topic {}", branch.name, n),
            lesson_id: LessonId::new(&branch.id, n),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_every_subject_in_order() {
        let ids: Vec<SubjectType> = catalog().iter().map(|s| s.id).collect();
        assert_eq!(ids, SubjectType::ALL.to_vec());
        let counts: Vec<usize> = catalog().iter().map(|s| s.branches.len()).collect();
        assert_eq!(counts, vec![10, 10, 5, 10, 10]);
    }

    #[test]
    fn branch_ids_are_prefixed_slugs() {
        assert_eq!(branch_id("BIO", "Cell Biology"), "BIO-CELL-BIOLOGY");
        assert_eq!(branch_id("BIO", "Anatomy & Physiology"), "BIO-ANATOMY-&-PHYSIOLOGY");
        assert_eq!(branch_id("ASTRO", "Infrared/Optical Astronomy"), "ASTRO-INFRARED/OPTICAL-ASTRONOMY");
        assert_eq!(branch_id("MATH", "Number   Theory"), "MATH-NUMBER-THEORY");
    }

    #[test]
    fn mathematics_branches_have_more_lessons() {
        let math = find_subject(SubjectType::Mathematics).unwrap();
        assert!(math.branches.iter().all(|b| b.total_lessons == 200));
        let bio = find_subject(SubjectType::Biology).unwrap();
        assert!(bio.branches.iter().all(|b| b.total_lessons == 100));
    }

    #[test]
    fn find_branch_by_id() {
        let physics = find_subject(SubjectType::Physics).unwrap();
        let optics = find_branch(physics, "PHYS-OPTICS").unwrap();
        assert_eq!(optics.name, "Optics");
        assert_eq!(optics.description, "Comprehensive study of Optics");
        assert!(find_branch(physics, "BIO-GENETICS").is_none());
    }

    #[test]
    fn outline_lists_ten_lessons() {
        let bio = find_subject(SubjectType::Biology).unwrap();
        let outline = lesson_outline(&bio.branches[2]);
        assert_eq!(outline.len(), 10);
        assert_eq!(outline[0].title, "Genetics - Topic 1");
        assert_eq!(outline[9].lesson_id.as_str(), "BIO-GENETICS-L10");
    }
}
