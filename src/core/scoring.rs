use crate::models::{
    MutualSkill, PairScores, ProfileAnalysis, ScoringWeights, SkillDirection, SkillEntry, User,
};

/// Score how well `teach` covers `learn` (0-1 before the composite clamp)
///
/// Contribution per (learn, teach) pair:
/// - exact case-insensitive name match: 1.0
/// - same non-null category:            0.3
/// - substring containment either way:  0.7
///
/// The sum is normalized by the longer of the two lists, so padding a list
/// with unrelated skills dilutes the score rather than inflating it.
pub fn score_skill_overlap(teach: &[SkillEntry], learn: &[SkillEntry]) -> f64 {
    if teach.is_empty() || learn.is_empty() {
        return 0.0;
    }

    let teach_names: Vec<String> = teach.iter().map(|s| normalized_name(s)).collect();

    let mut total = 0.0;
    for learn_skill in learn {
        let learn_name = normalized_name(learn_skill);
        if learn_name.is_empty() {
            continue;
        }

        for (teach_skill, teach_name) in teach.iter().zip(&teach_names) {
            if teach_name.is_empty() {
                continue;
            }

            if learn_name == *teach_name {
                total += 1.0;
            } else if same_category(learn_skill, teach_skill) {
                total += 0.3;
            } else if learn_name.contains(teach_name.as_str())
                || teach_name.contains(learn_name.as_str())
            {
                total += 0.7;
            }
        }
    }

    total / teach.len().max(learn.len()) as f64
}

/// Compatibility bonus from categorical personality traits (0.5-1.0)
///
/// Base 0.5; +0.2 for a shared personality type (+0.1 when both declared
/// but different); +0.3 for a shared daily rhythm. Capped at 1.0.
pub fn score_personality(a: &User, b: &User) -> f64 {
    let mut score: f64 = 0.5;

    if let (Some(pa), Some(pb)) = (a.personality_type, b.personality_type) {
        score += if pa == pb { 0.2 } else { 0.1 };
    }

    if let (Some(ra), Some(rb)) = (a.daily_rhythm, b.daily_rhythm) {
        if ra == rb {
            score += 0.3;
        }
    }

    score.min(1.0)
}

/// Skills present in one side's teach list and the other's learn list
///
/// Only exact case-insensitive name matches count as mutual; category and
/// substring matches contribute to the score but not to this list.
/// Direction is relative to `user` (the requesting side).
pub fn mutual_skills(user: &User, candidate: &User) -> Vec<MutualSkill> {
    let mut mutual = Vec::new();

    for teach_skill in &user.teach_skills {
        let name = normalized_name(teach_skill);
        if name.is_empty() {
            continue;
        }
        if candidate.learn_skills.iter().any(|l| normalized_name(l) == name) {
            mutual.push(MutualSkill {
                skill: teach_skill.name.clone(),
                teacher: user.name.clone(),
                learner: candidate.name.clone(),
                direction: SkillDirection::YouTeach,
                teacher_id: user.user_id.clone(),
                learner_id: candidate.user_id.clone(),
            });
        }
    }

    for teach_skill in &candidate.teach_skills {
        let name = normalized_name(teach_skill);
        if name.is_empty() {
            continue;
        }
        if user.learn_skills.iter().any(|l| normalized_name(l) == name) {
            mutual.push(MutualSkill {
                skill: teach_skill.name.clone(),
                teacher: candidate.name.clone(),
                learner: user.name.clone(),
                direction: SkillDirection::TheyTeach,
                teacher_id: candidate.user_id.clone(),
                learner_id: user.user_id.clone(),
            });
        }
    }

    mutual
}

/// Mean of the qualitative signals relevant to this orientation: the
/// requester's teaching expertise against the candidate's learning clarity
/// and overall profile quality.
pub fn qualitative_boost(user: &ProfileAnalysis, candidate: &ProfileAnalysis) -> f64 {
    (user.teaching_expertise + candidate.learning_clarity + candidate.profile_quality) / 3.0
}

/// Full score breakdown for a (requester, candidate) pair.
///
/// The qualitative boost applies only when both analyses are present;
/// either side missing degrades to skill+personality scoring.
pub fn score_pair(
    user: &User,
    candidate: &User,
    user_analysis: Option<&ProfileAnalysis>,
    candidate_analysis: Option<&ProfileAnalysis>,
    weights: &ScoringWeights,
) -> PairScores {
    let a_to_b = score_skill_overlap(&user.teach_skills, &candidate.learn_skills);
    let b_to_a = score_skill_overlap(&candidate.teach_skills, &user.learn_skills);
    let personality = score_personality(user, candidate);

    let base = (a_to_b + b_to_a) / 2.0;
    let mut final_score = base * weights.skills + personality * weights.personality;

    if let (Some(ua), Some(ca)) = (user_analysis, candidate_analysis) {
        final_score += qualitative_boost(ua, ca) * weights.qualitative;
    }

    PairScores {
        a_to_b,
        b_to_a,
        personality,
        final_score: final_score.clamp(0.0, 1.0),
    }
}

#[inline]
fn normalized_name(skill: &SkillEntry) -> String {
    skill.name.trim().to_lowercase()
}

#[inline]
fn same_category(a: &SkillEntry, b: &SkillEntry) -> bool {
    match (&a.category, &b.category) {
        (Some(ca), Some(cb)) => ca == cb,
        _ => false,
    }
}
